use anyhow::{anyhow, Result};
use ton20::{encode_operation, format_amount, parse_amount, Submitter, TokenOperation, TransactionRequest};

use super::{display_address, print_event, Context};
use crate::cli::MintArgs;

pub async fn run(ctx: &Context, args: &MintArgs) -> Result<()> {
    let amount = parse_amount(args.amount.amount.as_deref(), args.amount.amount_nano)?;
    let operation = TokenOperation::mint(&args.tick, amount)?;
    let payload = encode_operation(&operation)?;

    let chain = ctx.chain()?;
    let mut wallet = ctx.sending_wallet(&chain, &args.wallet).await?;

    let total = amount
        .checked_mul(u128::from(args.repeat))
        .and_then(|a| a.checked_mul(u128::from(args.msgs)))
        .ok_or_else(|| anyhow!("amount too large"))?;

    println!("Wallet: {}", display_address(wallet.address()));
    println!(
        "Sending {} transaction(s) with {} message(s) each",
        args.repeat, args.msgs
    );
    println!("You will mint: {} {}", format_amount(total), args.tick);

    let request = TransactionRequest::new(payload)
        .with_message_count(usize::from(args.msgs))
        .with_repeat_count(args.repeat);
    Submitter::new(&chain, ctx.submit_options(args.wallet.wait))
        .submit(&mut wallet, &request, print_event)
        .await?;
    Ok(())
}
