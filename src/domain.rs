use std::{fmt, str::FromStr};

use ethers::types::Address;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rpc::is_present;

/// Chain identifier as reported by a provider.
///
/// Modern providers answer `eth_chainId` with a hex string, legacy ones answer
/// `net_version` with a decimal string, and some expose plain numbers in their
/// ad hoc fields. The raw form is kept and normalized on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainId {
    Number(u64),
    Text(String),
}

impl ChainId {
    /// Builds a chain id from a provider value. Falsy or non-scalar values
    /// yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !is_present(value) {
            return None;
        }
        match value {
            Value::Number(n) => n.as_u64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Numeric value of the chain id, accepting `0x` hex and decimal strings.
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Self::Number(id) => Some(*id),
            Self::Text(text) => {
                let text = text.trim();
                match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16).ok(),
                    None => text.parse().ok(),
                }
            }
        }
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Parses an account address handed out by a provider. Anything that is not
/// a 20-byte hex string counts as no account.
pub fn parse_address(value: &Value) -> Option<Address> {
    let text = value.as_str()?;
    match Address::from_str(text) {
        Ok(address) => Some(address),
        Err(err) => {
            warn!("Ignoring malformed account {text:?}: {err}");
            None
        }
    }
}
