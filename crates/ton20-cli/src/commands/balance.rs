use anyhow::Result;
use ton20::{format_amount, BalanceIndexer, DtonIndexer, Ton20Error};
use ton20_cell::MsgAddress;

use super::Context;
use crate::cli::{BalanceArgs, MnemonicArgs};

pub async fn run(ctx: &Context, args: &BalanceArgs) -> Result<()> {
    let address = match &args.source.address {
        Some(text) => MsgAddress::from_string(text.trim())
            .map_err(|e| Ton20Error::Config(format!("invalid address: {}", e)))?,
        None => {
            let mnemonic = MnemonicArgs {
                mnemo: args.source.mnemo.clone(),
                mnemo_file: args.source.mnemo_file.clone(),
            };
            let chain = ctx.chain()?;
            let wallet = ctx
                .resolve_wallet(&chain, &mnemonic, args.wallet_type, false)
                .await?;
            *wallet.address()
        }
    };

    let indexer = DtonIndexer::new(&ctx.config.indexer_url, ctx.config.request_timeout())?;
    let balance = indexer.query_balance(&address, &args.tick).await?;
    println!(
        "Balance: {} {} ({} nano{})",
        format_amount(balance),
        args.tick,
        balance,
        args.tick
    );
    Ok(())
}
