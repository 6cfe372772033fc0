//! Wallet contract versions and version selection.

use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

/// Supported wallet contract versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletVersion {
    V3R2,
    V4R2,
}

impl WalletVersion {
    /// Lowercase name, as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            WalletVersion::V3R2 => "v3r2",
            WalletVersion::V4R2 => "v4r2",
        }
    }
}

impl fmt::Display for WalletVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletVersion {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v3r2" => Ok(WalletVersion::V3R2),
            "v4r2" => Ok(WalletVersion::V4R2),
            _ => Err(WalletError::UnknownVersion(s.to_string())),
        }
    }
}

/// Which wallet versions to consider for a set of credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalletSelector {
    /// Probe every supported version, newest first.
    #[default]
    Auto,
    /// Exactly one version.
    Exact(WalletVersion),
}

impl WalletSelector {
    /// Versions to probe, in priority order.
    pub fn candidates(self) -> Vec<WalletVersion> {
        match self {
            WalletSelector::Auto => vec![WalletVersion::V4R2, WalletVersion::V3R2],
            WalletSelector::Exact(version) => vec![version],
        }
    }
}

impl fmt::Display for WalletSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletSelector::Auto => f.write_str("auto"),
            WalletSelector::Exact(version) => version.fmt(f),
        }
    }
}

impl FromStr for WalletSelector {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(WalletSelector::Auto);
        }
        s.parse().map(WalletSelector::Exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("V4R2".parse::<WalletVersion>().unwrap(), WalletVersion::V4R2);
        assert_eq!("v3r2".parse::<WalletVersion>().unwrap(), WalletVersion::V3R2);
        assert_eq!("AUTO".parse::<WalletSelector>().unwrap(), WalletSelector::Auto);
        assert_eq!(
            "v3R2".parse::<WalletSelector>().unwrap(),
            WalletSelector::Exact(WalletVersion::V3R2)
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            "v5r1".parse::<WalletSelector>(),
            Err(WalletError::UnknownVersion(_))
        ));
    }

    #[test]
    fn test_auto_probe_order() {
        assert_eq!(
            WalletSelector::Auto.candidates(),
            vec![WalletVersion::V4R2, WalletVersion::V3R2]
        );
        assert_eq!(
            WalletSelector::Exact(WalletVersion::V3R2).candidates(),
            vec![WalletVersion::V3R2]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(WalletVersion::V4R2.to_string(), "v4r2");
        assert_eq!(WalletSelector::Auto.to_string(), "auto");
    }
}
