use anyhow::Result;
use ton20::{encode_operation, parse_amount_field, Submitter, TokenOperation, TransactionRequest};

use super::{print_event, Context};
use crate::cli::DeployArgs;

pub async fn run(ctx: &Context, args: &DeployArgs) -> Result<()> {
    let supply = parse_amount_field("supply", args.supply.supply.as_deref(), args.supply.supply_nano)?;
    let one_mint = parse_amount_field(
        "one-mint",
        args.one_mint.one_mint.as_deref(),
        args.one_mint.one_mint_nano,
    )?;
    let operation = TokenOperation::deploy(&args.tick, supply, one_mint)?;
    let payload = encode_operation(&operation)?;

    let chain = ctx.chain()?;
    let mut wallet = ctx.sending_wallet(&chain, &args.wallet).await?;

    Submitter::new(&chain, ctx.submit_options(args.wallet.wait))
        .submit(&mut wallet, &TransactionRequest::new(payload), print_event)
        .await?;
    println!("Sent deploy tx");
    Ok(())
}
