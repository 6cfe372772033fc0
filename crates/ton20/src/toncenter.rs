//! toncenter v2 HTTP adapter for [`ChainService`].

use std::time::Duration;

use serde_json::{json, Value};
use ton20_cell::MsgAddress;
use tracing::{debug, trace};

use crate::amount::Amount;
use crate::chain::{AccountStatus, ChainService, WalletState};
use crate::error::{Ton20Error, Ton20Result};

/// Public mainnet endpoint.
pub const DEFAULT_TONCENTER_URL: &str = "https://toncenter.com/api/v2";

/// Chain access through a toncenter v2 JSON API.
#[derive(Debug, Clone)]
pub struct TonCenterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl TonCenterClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Ton20Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(TonCenterClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("X-API-Key", key),
            None => request,
        }
    }

    async fn call(&self, request: reqwest::RequestBuilder) -> Ton20Result<Value> {
        let response = self.with_key(request).send().await?;
        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            Ton20Error::Network(format!("toncenter returned HTTP {} with unreadable body: {}", status, e))
        })?;
        trace!(%status, %body, "toncenter response");
        unwrap_result(body)
    }
}

/// Take `result` out of a toncenter envelope, turning `"ok": false` into an
/// error.
fn unwrap_result(mut body: Value) -> Ton20Result<Value> {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        let code = body.get("code").and_then(Value::as_i64);
        return Err(Ton20Error::Network(match code {
            Some(code) => format!("toncenter error {}: {}", code, error),
            None => format!("toncenter error: {}", error),
        }));
    }
    body.get_mut("result")
        .map(Value::take)
        .ok_or_else(|| Ton20Error::Network("toncenter response has no result".to_string()))
}

/// Parse the `result` of `getWalletInformation`.
pub fn parse_wallet_information(result: &Value) -> Ton20Result<WalletState> {
    let malformed = |what: &str| Ton20Error::Network(format!("malformed wallet information: {}", what));

    let state_name = result
        .get("account_state")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing account_state"))?;
    let status = AccountStatus::from_name(state_name)
        .ok_or_else(|| malformed(&format!("unknown account_state {:?}", state_name)))?;

    let balance: Amount = match result.get("balance") {
        Some(Value::String(s)) => s.parse().map_err(|_| malformed("bad balance"))?,
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Amount::from)
            .ok_or_else(|| malformed("bad balance"))?,
        Some(_) => return Err(malformed("bad balance")),
        None => 0,
    };

    let seqno = match result.get("seqno") {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| malformed("bad seqno"))?,
        Some(Value::Null) | None => 0,
        Some(_) => return Err(malformed("bad seqno")),
    };

    Ok(WalletState {
        status,
        balance,
        seqno,
    })
}

#[async_trait::async_trait]
impl ChainService for TonCenterClient {
    async fn get_wallet_state(&self, address: &MsgAddress) -> Ton20Result<WalletState> {
        let request = self
            .http
            .get(self.url("getWalletInformation"))
            .query(&[("address", address.to_raw_string())]);
        let result = self.call(request).await?;
        let state = parse_wallet_information(&result)?;
        debug!(
            %address,
            status = ?state.status,
            balance = state.balance,
            seqno = state.seqno,
            "wallet state"
        );
        Ok(state)
    }

    async fn send_external_message(&self, boc: &[u8]) -> Ton20Result<()> {
        let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, boc);
        let request = self
            .http
            .post(self.url("sendBoc"))
            .json(&json!({ "boc": encoded }));
        self.call(request).await?;
        debug!(bytes = boc.len(), "external message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_active_wallet() {
        let result = json!({
            "wallet": true,
            "balance": "1500000000",
            "account_state": "active",
            "wallet_type": "wallet v4 r2",
            "seqno": 5,
            "wallet_id": 698983191
        });
        let state = parse_wallet_information(&result).unwrap();
        assert_eq!(
            state,
            WalletState {
                status: AccountStatus::Active,
                balance: 1_500_000_000,
                seqno: 5,
            }
        );
    }

    #[test]
    fn test_parse_uninitialized_wallet() {
        let result = json!({
            "wallet": false,
            "balance": "200000000",
            "account_state": "uninitialized"
        });
        let state = parse_wallet_information(&result).unwrap();
        assert_eq!(state.status, AccountStatus::Uninit);
        assert_eq!(state.balance, 200_000_000);
        assert_eq!(state.seqno, 0);
    }

    #[test]
    fn test_parse_numeric_balance() {
        let result = json!({ "balance": 42, "account_state": "active", "seqno": null });
        let state = parse_wallet_information(&result).unwrap();
        assert_eq!(state.balance, 42);
        assert_eq!(state.seqno, 0);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_wallet_information(&json!({ "balance": "1" })).is_err());
        assert!(parse_wallet_information(&json!({ "account_state": "odd" })).is_err());
        assert!(parse_wallet_information(&json!({
            "account_state": "active",
            "balance": "-1"
        }))
        .is_err());
        assert!(parse_wallet_information(&json!({
            "account_state": "active",
            "seqno": "five"
        }))
        .is_err());
    }

    #[test]
    fn test_unwrap_result() {
        let ok = unwrap_result(json!({ "ok": true, "result": { "@type": "ok" } })).unwrap();
        assert_eq!(ok["@type"], "ok");

        let err = unwrap_result(json!({
            "ok": false,
            "error": "LITE_SERVER_UNKNOWN: cannot apply external message",
            "code": 500
        }))
        .unwrap_err();
        assert!(matches!(err, Ton20Error::Network(_)));
        assert_eq!(
            err.to_string(),
            "network error: toncenter error 500: LITE_SERVER_UNKNOWN: cannot apply external message"
        );

        assert!(unwrap_result(json!({ "ok": true })).is_err());
    }

    #[test]
    fn test_url_join() {
        let client =
            TonCenterClient::new("https://example.org/api/v2/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("sendBoc"), "https://example.org/api/v2/sendBoc");
    }
}
