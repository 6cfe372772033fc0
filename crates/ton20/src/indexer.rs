//! Token balance lookups.
//!
//! TON20 balances live in an off-chain indexer, not in any contract. The
//! engine only asks one question of it, through [`BalanceIndexer`].

use std::time::Duration;

use serde_json::{json, Value};
use ton20_cell::MsgAddress;
use tracing::debug;

use crate::amount::Amount;
use crate::error::{Ton20Error, Ton20Result};

/// dton.io GraphQL endpoint serving TON20 wallets.
pub const DEFAULT_INDEXER_URL: &str = "https://dton.io/graphql_tonano";

const WALLET_COINS_QUERY: &str = "query GetWalletCoins($address: String, $tick: String) {
    coins: ton20wallets(address: $address, tick: $tick) {
        amount
        address
        tick
    }
}";

/// Source of TON20 balances.
#[async_trait::async_trait]
pub trait BalanceIndexer: Send + Sync {
    /// Balance of `ticker` held by `address`, in nano-units.
    async fn query_balance(&self, address: &MsgAddress, ticker: &str) -> Ton20Result<Amount>;
}

/// [`BalanceIndexer`] backed by the dton.io GraphQL API.
#[derive(Debug, Clone)]
pub struct DtonIndexer {
    http: reqwest::Client,
    url: String,
}

impl DtonIndexer {
    pub fn new(url: &str, timeout: Duration) -> Ton20Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(DtonIndexer {
            http,
            url: url.to_string(),
        })
    }
}

/// GraphQL request body for the balance of `ticker` at `address`.
pub fn balance_request(address: &MsgAddress, ticker: &str) -> Ton20Result<Value> {
    let address = address
        .to_user_friendly(true, false)
        .ok_or_else(|| Ton20Error::Config("cannot query the balance of an empty address".into()))?;
    Ok(json!({
        "operationName": "GetWalletCoins",
        "variables": {
            "address": address,
            "tick": ticker,
        },
        "query": WALLET_COINS_QUERY,
    }))
}

/// Extract the balance from a `GetWalletCoins` response.
///
/// No rows means the wallet never held the token: balance 0.
pub fn parse_balance_response(response: &Value) -> Ton20Result<Amount> {
    let malformed = |what: &str| Ton20Error::Network(format!("indexer: {}", what));

    if let Some(errors) = response.get("errors").filter(|e| !e.is_null()) {
        return Err(malformed(&format!("query failed: {}", errors)));
    }
    let data = response
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| malformed("response has no data"))?;
    let coins = data
        .get("coins")
        .ok_or_else(|| malformed("response has no coins"))?;

    let first = match coins {
        Value::Null => return Ok(0),
        Value::Array(rows) => match rows.first() {
            Some(row) => row,
            None => return Ok(0),
        },
        _ => return Err(malformed("coins is not a list")),
    };

    match first.get("amount") {
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| malformed(&format!("bad amount {:?}", s))),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Amount::from)
            .ok_or_else(|| malformed(&format!("bad amount {}", n))),
        Some(other) => Err(malformed(&format!("bad amount {}", other))),
        None => Err(malformed("coin row has no amount")),
    }
}

#[async_trait::async_trait]
impl BalanceIndexer for DtonIndexer {
    async fn query_balance(&self, address: &MsgAddress, ticker: &str) -> Ton20Result<Amount> {
        let request = balance_request(address, ticker)?;
        let response: Value = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;
        let balance = parse_balance_response(&response)?;
        debug!(%address, ticker, balance, "indexer balance");
        Ok(balance)
    }
}
