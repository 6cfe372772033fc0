use anyhow::Result;
use ton20::{encode_operation, parse_amount, Recipient, Submitter, TokenOperation, TransactionRequest};

use super::{print_event, Context};
use crate::cli::TransferArgs;

pub async fn run(ctx: &Context, args: &TransferArgs) -> Result<()> {
    let amount = parse_amount(args.amount.amount.as_deref(), args.amount.amount_nano)?;
    let recipient = Recipient::parse(&args.to)?;
    let operation = TokenOperation::transfer(&args.tick, amount, recipient)?;
    let payload = encode_operation(&operation)?;

    let chain = ctx.chain()?;
    let mut wallet = ctx.sending_wallet(&chain, &args.wallet).await?;

    Submitter::new(&chain, ctx.submit_options(args.wallet.wait))
        .submit(&mut wallet, &TransactionRequest::new(payload), print_event)
        .await?;
    println!("Sent transfer tx");
    Ok(())
}
