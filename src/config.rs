use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::prelude::deserialize_number_from_string;
use wasm_bindgen::JsValue;

use super::domain::ChainId;

/// Chains the deployed wallet front-end accepts.
pub const DEFAULT_SUPPORTED_CHAIN_IDS: [u64; 6] = [1, 3, 4, 5, 42, 168169];

/// Chain the application's own network connector points at.
pub const DEFAULT_NETWORK_CHAIN_ID: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
    #[serde(
        default = "default_supported_chain_ids",
        deserialize_with = "deserialize_chain_ids"
    )]
    pub supported_chain_ids: Vec<u64>,

    #[serde(
        default = "default_network_chain_id",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub network_chain_id: u64,
}

impl ConnectorConfig {
    pub fn new(supported_chain_ids: Vec<u64>) -> Self {
        Self { supported_chain_ids, network_chain_id: DEFAULT_NETWORK_CHAIN_ID }
    }

    /// Reads the configuration from a plain JS object, e.g.
    /// `{ supportedChainIds: [1, "168169"], networkChainId: "1" }`.
    pub fn from_js(value: JsValue) -> Result<Self, super::Error> {
        Ok(serde_wasm_bindgen::from_value(value)?)
    }

    pub fn supports(&self, chain_id: &ChainId) -> bool {
        chain_id.to_u64().is_some_and(|id| self.supported_chain_ids.contains(&id))
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPORTED_CHAIN_IDS.to_vec())
    }
}

fn default_supported_chain_ids() -> Vec<u64> {
    DEFAULT_SUPPORTED_CHAIN_IDS.to_vec()
}

fn default_network_chain_id() -> u64 {
    DEFAULT_NETWORK_CHAIN_ID
}

fn deserialize_chain_ids<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    Vec::<ChainId>::deserialize(deserializer)?
        .into_iter()
        .map(|id| id.to_u64().ok_or_else(|| D::Error::custom(format!("invalid chain id {id}"))))
        .collect()
}
