use derive_more::Display;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    domain::{parse_address, ChainId},
    provider::ProviderHandle,
};

/// Event names the connector subscribes to on the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "chainChanged")]
    #[display(fmt = "chainChanged")]
    ChainChanged,
    #[serde(rename = "accountsChanged")]
    #[display(fmt = "accountsChanged")]
    AccountsChanged,
    #[serde(rename = "close")]
    #[display(fmt = "close")]
    Close,
    #[serde(rename = "networkChanged")]
    #[display(fmt = "networkChanged")]
    NetworkChanged,
}

impl EventName {
    pub const ALL: [EventName; 4] =
        [Self::ChainChanged, Self::AccountsChanged, Self::Close, Self::NetworkChanged];
}

/// State change pushed by the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    ChainChanged { chain_id: Option<ChainId> },
    /// One entry per listed account; `None` where the entry is not an address.
    AccountsChanged { accounts: Vec<Option<Address>> },
    Closed { code: Option<i64>, reason: Option<String> },
    NetworkChanged { network_id: Option<ChainId> },
}

impl ProviderEvent {
    /// Decodes the arguments a provider passed to a listener for `name`.
    ///
    /// An `accountsChanged` payload that is not a list reads as a list of one
    /// entry. The list keeps its length when entries are not addresses.
    pub fn decode(name: EventName, args: &[Value]) -> Self {
        let first = args.first().unwrap_or(&Value::Null);
        match name {
            EventName::ChainChanged => Self::ChainChanged { chain_id: ChainId::from_value(first) },
            EventName::NetworkChanged => {
                Self::NetworkChanged { network_id: ChainId::from_value(first) }
            }
            EventName::AccountsChanged => Self::AccountsChanged {
                accounts: match first.as_array() {
                    Some(items) => items.iter().map(parse_address).collect(),
                    None => vec![parse_address(first)],
                },
            },
            EventName::Close => Self::Closed {
                code: first.as_i64(),
                reason: args.get(1).and_then(Value::as_str).map(str::to_string),
            },
        }
    }

    pub fn name(&self) -> EventName {
        match self {
            Self::ChainChanged { .. } => EventName::ChainChanged,
            Self::AccountsChanged { .. } => EventName::AccountsChanged,
            Self::Closed { .. } => EventName::Close,
            Self::NetworkChanged { .. } => EventName::NetworkChanged,
        }
    }
}

/// Fields that changed since the last update. Unset fields are unchanged.
#[derive(Debug, Clone, Default)]
pub struct ConnectorUpdate {
    pub provider: Option<ProviderHandle>,
    pub chain_id: Option<ChainId>,
    pub account: Option<Address>,
}

/// Notification delivered to the connector's owner.
#[derive(Debug, Clone)]
pub enum Event {
    Update(ConnectorUpdate),
    Deactivate,
}
