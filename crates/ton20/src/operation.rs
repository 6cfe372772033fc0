//! TON20 token operations and their canonical JSON form.

use std::borrow::Cow;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use ton20_cell::MsgAddress;

use crate::amount::Amount;
use crate::error::{Ton20Error, Ton20Result};

/// Protocol tag carried in every operation.
pub const PROTOCOL: &str = "ton-20";

/// A transfer recipient: a valid TON address, kept exactly as the user
/// wrote it so the payload names it the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    text: String,
    address: MsgAddress,
}

impl Recipient {
    /// Surrounding whitespace is ignored when validating but kept in the text.
    pub fn parse(text: &str) -> Ton20Result<Self> {
        let address = MsgAddress::from_string(text.trim())
            .map_err(|e| Ton20Error::Config(format!("invalid recipient address: {}", e)))?;
        Ok(Recipient {
            text: text.to_string(),
            address,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn address(&self) -> &MsgAddress {
        &self.address
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A TON20 operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOperation {
    Deploy {
        ticker: String,
        max_supply: Amount,
        limit_per_mint: Amount,
    },
    Mint {
        ticker: String,
        amount: Amount,
    },
    Transfer {
        ticker: String,
        amount: Amount,
        recipient: Recipient,
    },
}

/// Wire form. Field order here is the key order on the wire; absent fields
/// are omitted.
#[derive(Serialize, Deserialize)]
struct WireOperation<'a> {
    p: Cow<'a, str>,
    op: Cow<'a, str>,
    tick: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    lim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    to: Option<Cow<'a, str>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    amt: Option<String>,
}

impl TokenOperation {
    pub fn deploy(ticker: &str, max_supply: Amount, limit_per_mint: Amount) -> Ton20Result<Self> {
        Ok(TokenOperation::Deploy {
            ticker: validate_ticker(ticker)?,
            max_supply,
            limit_per_mint,
        })
    }

    pub fn mint(ticker: &str, amount: Amount) -> Ton20Result<Self> {
        Ok(TokenOperation::Mint {
            ticker: validate_ticker(ticker)?,
            amount,
        })
    }

    pub fn transfer(ticker: &str, amount: Amount, recipient: Recipient) -> Ton20Result<Self> {
        Ok(TokenOperation::Transfer {
            ticker: validate_ticker(ticker)?,
            amount,
            recipient,
        })
    }

    /// The `op` field value.
    pub fn op_name(&self) -> &'static str {
        match self {
            TokenOperation::Deploy { .. } => "deploy",
            TokenOperation::Mint { .. } => "mint",
            TokenOperation::Transfer { .. } => "transfer",
        }
    }

    pub fn ticker(&self) -> &str {
        match self {
            TokenOperation::Deploy { ticker, .. }
            | TokenOperation::Mint { ticker, .. }
            | TokenOperation::Transfer { ticker, .. } => ticker,
        }
    }

    fn to_wire(&self) -> WireOperation<'_> {
        let mut wire = WireOperation {
            p: Cow::Borrowed(PROTOCOL),
            op: Cow::Borrowed(self.op_name()),
            tick: Cow::Borrowed(self.ticker()),
            max: None,
            lim: None,
            to: None,
            amt: None,
        };
        match self {
            TokenOperation::Deploy {
                max_supply,
                limit_per_mint,
                ..
            } => {
                wire.max = Some(max_supply.to_string());
                wire.lim = Some(limit_per_mint.to_string());
            }
            TokenOperation::Mint { amount, .. } => {
                wire.amt = Some(amount.to_string());
            }
            TokenOperation::Transfer {
                amount, recipient, ..
            } => {
                wire.to = Some(Cow::Borrowed(recipient.as_str()));
                wire.amt = Some(amount.to_string());
            }
        }
        wire
    }

    /// Canonical compact JSON, non-ASCII escaped as `\uXXXX`.
    pub fn to_json(&self) -> Ton20Result<String> {
        let mut out = Vec::with_capacity(96);
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
        self.to_wire()
            .serialize(&mut serializer)
            .map_err(|e| Ton20Error::Config(format!("failed to encode operation: {}", e)))?;
        String::from_utf8(out)
            .map_err(|e| Ton20Error::Config(format!("failed to encode operation: {}", e)))
    }

    /// Parse the JSON form back into an operation.
    pub fn from_json(json: &str) -> Ton20Result<Self> {
        let invalid = |what: &str| Ton20Error::Config(format!("invalid operation: {}", what));

        let wire: WireOperation<'_> =
            serde_json::from_str(json).map_err(|e| invalid(&e.to_string()))?;
        if wire.p != PROTOCOL {
            return Err(invalid(&format!("unknown protocol {:?}", wire.p)));
        }

        let amount = |field: &str, value: Option<String>| -> Ton20Result<Amount> {
            value
                .ok_or_else(|| invalid(&format!("missing {}", field)))?
                .parse()
                .map_err(|_| invalid(&format!("bad {}", field)))
        };

        match wire.op.as_ref() {
            "deploy" => Self::deploy(&wire.tick, amount("max", wire.max)?, amount("lim", wire.lim)?),
            "mint" => Self::mint(&wire.tick, amount("amt", wire.amt)?),
            "transfer" => {
                let to = wire.to.ok_or_else(|| invalid("missing to"))?;
                Self::transfer(&wire.tick, amount("amt", wire.amt)?, Recipient::parse(&to)?)
            }
            other => Err(invalid(&format!("unknown op {:?}", other))),
        }
    }
}

fn validate_ticker(ticker: &str) -> Ton20Result<String> {
    if ticker.is_empty() {
        return Err(Ton20Error::Config("ticker must not be empty".to_string()));
    }
    Ok(ticker.to_string())
}

/// Compact formatter that escapes every non-ASCII character.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c";

    #[test]
    fn test_mint_json() {
        let op = TokenOperation::mint("grum", 100_000_000_000).unwrap();
        assert_eq!(
            op.to_json().unwrap(),
            r#"{"p":"ton-20","op":"mint","tick":"grum","amt":"100000000000"}"#
        );
    }

    #[test]
    fn test_deploy_json() {
        let op = TokenOperation::deploy("grum", 1_000_000_000_000_000, 500_000_000).unwrap();
        assert_eq!(
            op.to_json().unwrap(),
            r#"{"p":"ton-20","op":"deploy","tick":"grum","max":"1000000000000000","lim":"500000000"}"#
        );
    }

    #[test]
    fn test_transfer_json_keeps_recipient_text() {
        let recipient = Recipient::parse(RECIPIENT).unwrap();
        let op = TokenOperation::transfer("grum", 5, recipient).unwrap();
        assert_eq!(
            op.to_json().unwrap(),
            format!(
                r#"{{"p":"ton-20","op":"transfer","tick":"grum","to":"{}","amt":"5"}}"#,
                RECIPIENT
            )
        );
    }

    #[test]
    fn test_large_amount_not_scientific() {
        let op = TokenOperation::mint("grum", u128::MAX).unwrap();
        assert!(op
            .to_json()
            .unwrap()
            .contains(r#""amt":"340282366920938463463374607431768211455""#));
    }

    #[test]
    fn test_non_ascii_escaped() {
        let op = TokenOperation::mint("грум😀", 1).unwrap();
        assert_eq!(
            op.to_json().unwrap(),
            r#"{"p":"ton-20","op":"mint","tick":"\u0433\u0440\u0443\u043c\ud83d\ude00","amt":"1"}"#
        );
    }

    #[test]
    fn test_quotes_escaped() {
        let op = TokenOperation::mint("a\"b", 1).unwrap();
        assert!(op.to_json().unwrap().contains(r#""tick":"a\"b""#));
    }

    #[test]
    fn test_json_roundtrip() {
        let ops = vec![
            TokenOperation::mint("grum", 7).unwrap(),
            TokenOperation::deploy("ñ", 10, 1).unwrap(),
            TokenOperation::transfer("grum", 3, Recipient::parse(RECIPIENT).unwrap()).unwrap(),
        ];
        for op in ops {
            let json = op.to_json().unwrap();
            assert_eq!(TokenOperation::from_json(&json).unwrap(), op);
        }
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(TokenOperation::from_json(r#"{"p":"brc-20","op":"mint","tick":"a","amt":"1"}"#).is_err());
        assert!(TokenOperation::from_json(r#"{"p":"ton-20","op":"burn","tick":"a","amt":"1"}"#).is_err());
        assert!(TokenOperation::from_json(r#"{"p":"ton-20","op":"mint","tick":"a"}"#).is_err());
        assert!(TokenOperation::from_json(r#"{"p":"ton-20","op":"mint","tick":"a","amt":"1.5"}"#).is_err());
    }

    #[test]
    fn test_empty_ticker_rejected() {
        assert_eq!(
            TokenOperation::mint("", 1).unwrap_err().to_string(),
            "ticker must not be empty"
        );
    }

    #[test]
    fn test_recipient_validation() {
        assert!(Recipient::parse("not-an-address").is_err());
        let raw = "0:0000000000000000000000000000000000000000000000000000000000000000";
        let recipient = Recipient::parse(raw).unwrap();
        assert_eq!(recipient.as_str(), raw);
        assert_eq!(
            recipient.address(),
            Recipient::parse(RECIPIENT).unwrap().address()
        );
    }

    #[test]
    fn test_recipient_text_kept_as_typed() {
        let typed = format!(" {}\t", RECIPIENT);
        let recipient = Recipient::parse(&typed).unwrap();
        assert_eq!(recipient.as_str(), typed);
        assert_eq!(
            recipient.address(),
            Recipient::parse(RECIPIENT).unwrap().address()
        );

        let op = TokenOperation::transfer("grum", 3, recipient).unwrap();
        let json = op.to_json().unwrap();
        assert!(json.contains(&format!("\"to\":\" {}\\t\"", RECIPIENT)));
    }
}
