//! TON message addresses.
//!
//! Wallet messages only ever carry `addr_none` or a standard internal
//! address, so those are the two forms [`MsgAddress`] models.

use crate::{CellError, CellResult};

/// Length of a user-friendly address once base64-decoded:
/// tag, workchain, 32-byte account id, CRC16.
const FRIENDLY_LEN: usize = 36;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET: u8 = 0x80;

/// TON Message Address.
///
/// # Example
///
/// ```
/// use ton20_cell::MsgAddress;
///
/// let addr = MsgAddress::from_string(
///     "0:0000000000000000000000000000000000000000000000000000000000000000",
/// )
/// .unwrap();
/// assert_eq!(
///     addr.to_user_friendly(true, false).unwrap(),
///     "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MsgAddress {
    /// No address (addr_none$00).
    #[default]
    Null,

    /// Standard internal address (addr_std$10, no anycast).
    Internal {
        /// Workchain ID (-1 for masterchain, 0 for basechain).
        workchain: i32,
        /// 256-bit account ID.
        address: [u8; 32],
    },
}

impl MsgAddress {
    /// Parse an address from a string.
    ///
    /// Supported formats:
    /// - Raw: `workchain:hex_address` (e.g. `0:abc123...`)
    /// - User-friendly base64, URL-safe or standard alphabet
    ///   (`EQ...`, `UQ...`, `kQ...`, `0Q...`)
    pub fn from_string(s: &str) -> CellResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CellError::InvalidAddress("empty address".to_string()));
        }

        if let Some((workchain_str, address_str)) = s.split_once(':') {
            return Self::from_raw(workchain_str, address_str);
        }

        if s.len() == 48 {
            return Self::from_user_friendly(s);
        }

        Err(CellError::InvalidAddress(format!(
            "Unrecognized address format: {}",
            s
        )))
    }

    fn from_raw(workchain_str: &str, address_str: &str) -> CellResult<Self> {
        let workchain: i32 = workchain_str.parse().map_err(|_| {
            CellError::InvalidAddress(format!("Invalid workchain: {}", workchain_str))
        })?;
        if i8::try_from(workchain).is_err() {
            return Err(CellError::InvalidAddress(format!(
                "Workchain out of range: {}",
                workchain
            )));
        }

        if address_str.len() != 64 {
            return Err(CellError::InvalidAddress(format!(
                "Address hex must be 64 characters, got {}",
                address_str.len()
            )));
        }

        let mut address = [0u8; 32];
        hex::decode_to_slice(address_str, &mut address)
            .map_err(|e| CellError::InvalidAddress(format!("Invalid hex: {}", e)))?;

        Ok(MsgAddress::Internal { workchain, address })
    }

    /// Format: 1 byte tag + 1 byte workchain + 32 bytes address + 2 bytes CRC16.
    fn from_user_friendly(s: &str) -> CellResult<Self> {
        let standard_b64: String = s
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();

        let bytes =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &standard_b64)
                .map_err(|e| CellError::InvalidBase64(e.to_string()))?;

        if bytes.len() != FRIENDLY_LEN {
            return Err(CellError::InvalidAddress(format!(
                "User-friendly address must be {} bytes, got {}",
                FRIENDLY_LEN,
                bytes.len()
            )));
        }

        let expected_crc = u16::from_be_bytes([bytes[34], bytes[35]]);
        let actual_crc = crc16_xmodem(&bytes[..34]);
        if expected_crc != actual_crc {
            return Err(CellError::InvalidAddress(format!(
                "CRC16 mismatch: expected {:04x}, got {:04x}",
                expected_crc, actual_crc
            )));
        }

        let tag = bytes[0] & !TAG_TESTNET;
        if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
            return Err(CellError::InvalidAddress(format!(
                "Unknown address tag: {:02x}",
                bytes[0]
            )));
        }

        let workchain = bytes[1] as i8 as i32;
        let mut address = [0u8; 32];
        address.copy_from_slice(&bytes[2..34]);

        Ok(MsgAddress::Internal { workchain, address })
    }

    /// Raw `workchain:hex` form. Empty for the null address.
    pub fn to_raw_string(&self) -> String {
        match self {
            MsgAddress::Null => String::new(),
            MsgAddress::Internal { workchain, address } => {
                format!("{}:{}", workchain, hex::encode(address))
            }
        }
    }

    /// URL-safe base64 form, or `None` for the null address.
    pub fn to_user_friendly(&self, bounceable: bool, testnet: bool) -> Option<String> {
        let MsgAddress::Internal { workchain, address } = self else {
            return None;
        };

        let mut data = Vec::with_capacity(FRIENDLY_LEN);
        let mut tag = if bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if testnet {
            tag |= TAG_TESTNET;
        }
        data.push(tag);
        data.push(*workchain as i8 as u8);
        data.extend_from_slice(address);
        data.extend_from_slice(&crc16_xmodem(&data).to_be_bytes());

        Some(base64::Engine::encode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            &data,
        ))
    }

    /// Get the workchain ID (if internal address).
    pub fn workchain(&self) -> Option<i32> {
        match self {
            MsgAddress::Internal { workchain, .. } => Some(*workchain),
            MsgAddress::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MsgAddress::Null)
    }
}

impl std::fmt::Display for MsgAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_raw_string())
    }
}

impl std::str::FromStr for MsgAddress {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_XMODEM);
    CRC16.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_RAW: &str = "0:0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn test_null_address() {
        let addr = MsgAddress::Null;
        assert!(addr.is_null());
        assert_eq!(addr.workchain(), None);
        assert_eq!(addr.to_user_friendly(true, false), None);
    }

    #[test]
    fn test_from_raw_string() {
        let addr = MsgAddress::from_string(ZERO_RAW).unwrap();
        assert_eq!(addr.workchain(), Some(0));
        assert_eq!(
            addr,
            MsgAddress::Internal {
                workchain: 0,
                address: [0u8; 32],
            }
        );
    }

    #[test]
    fn test_from_raw_string_masterchain() {
        let addr = MsgAddress::from_string(
            "-1:3333333333333333333333333333333333333333333333333333333333333333",
        )
        .unwrap();
        assert_eq!(addr.workchain(), Some(-1));
        assert_eq!(
            addr.to_user_friendly(true, false).unwrap(),
            "Ef8zMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzM0vF"
        );
    }

    #[test]
    fn test_user_friendly_forms() {
        let addr = MsgAddress::from_string(ZERO_RAW).unwrap();
        assert_eq!(
            addr.to_user_friendly(true, false).unwrap(),
            "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c"
        );
        assert_eq!(
            addr.to_user_friendly(false, false).unwrap(),
            "UQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAJKZ"
        );

        for friendly in [
            "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c",
            "UQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAJKZ",
        ] {
            assert_eq!(MsgAddress::from_string(friendly).unwrap(), addr);
        }
    }

    #[test]
    fn test_bad_crc_rejected() {
        let result = MsgAddress::from_string("EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9d");
        assert!(matches!(result, Err(CellError::InvalidAddress(_))));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(MsgAddress::from_string("").is_err());
        assert!(MsgAddress::from_string("not an address").is_err());
        assert!(MsgAddress::from_string("0:abcd").is_err());
        assert!(MsgAddress::from_string(
            "x:0000000000000000000000000000000000000000000000000000000000000000"
        )
        .is_err());
        assert!(MsgAddress::from_string(
            "0:zz00000000000000000000000000000000000000000000000000000000000000"
        )
        .is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let addr = MsgAddress::Internal {
            workchain: 0,
            address: [0x12; 32],
        };
        let parsed: MsgAddress = addr.to_string().parse().unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn test_crc16_xmodem_vector() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
    }
}
