
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{DialectError, DialectErrorKind};

/// Dialect variants known to the engine.
///
/// Adding a variant forces every `match` over the set (voice styles, ids) to be
/// revisited.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectId {
    Standard,
    Shanghai,
    Sichuan,
    Gyeongsang,
    Jeju,
}

impl DialectId {
    pub const ALL: [DialectId; 5] = [
        Self::Standard,
        Self::Shanghai,
        Self::Sichuan,
        Self::Gyeongsang,
        Self::Jeju,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Shanghai => "shanghai",
            Self::Sichuan => "sichuan",
            Self::Gyeongsang => "gyeongsang",
            Self::Jeju => "jeju",
        }
    }

    pub fn is_standard(&self) -> bool {
        *self == Self::Standard
    }
}

impl fmt::Display for DialectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectId {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(key))
            .ok_or_else(|| DialectError::new(DialectErrorKind::UnknownDialect(s.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_case_insensitively() {
        assert_eq!("shanghai".parse::<DialectId>().unwrap(), DialectId::Shanghai);
        assert_eq!(" JEJU ".parse::<DialectId>().unwrap(), DialectId::Jeju);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let err = "nonexistent-dialect-id".parse::<DialectId>().unwrap_err();
        assert_eq!(err.as_inner(), &DialectErrorKind::UnknownDialect("nonexistent-dialect-id".into()));
    }

    #[test]
    fn serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&DialectId::Gyeongsang).unwrap();
        assert_eq!(json, "\"gyeongsang\"");
        for id in DialectId::ALL {
            assert_eq!(id.to_string().parse::<DialectId>().unwrap(), id);
        }
    }
}
