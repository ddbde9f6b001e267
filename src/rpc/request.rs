use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Request methods the connector sends to an injected provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "eth_requestAccounts")]
    #[display(fmt = "eth_requestAccounts")]
    RequestAccounts,
    #[serde(rename = "eth_accounts")]
    #[display(fmt = "eth_accounts")]
    Accounts,
    #[serde(rename = "eth_chainId")]
    #[display(fmt = "eth_chainId")]
    ChainId,
    #[serde(rename = "net_version")]
    #[display(fmt = "net_version")]
    NetVersion,
}

/// Argument object of the EIP-1193 `request` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: Method,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl RequestArguments {
    pub fn new(method: Method) -> Self {
        Self { method, params: None }
    }
}

impl From<Method> for RequestArguments {
    fn from(method: Method) -> Self {
        Self::new(method)
    }
}
