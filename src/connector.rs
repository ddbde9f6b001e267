use async_trait::async_trait;
use ethers::types::Address;

use super::{domain::ChainId, provider::ProviderHandle, Error};

/// Outcome of a successful activation.
#[derive(Debug, Clone)]
pub struct ActivationResult {
    pub provider: ProviderHandle,
    /// `None` when the wallet connected without an unlocked account.
    pub account: Option<Address>,
}

/// Lifecycle shared by every wallet connector. Updates and deactivation
/// signals reach the owner through the listener given at construction.
#[async_trait(?Send)]
pub trait Connector {
    async fn activate(&self) -> Result<ActivationResult, Error>;

    fn get_provider(&self) -> Option<ProviderHandle>;

    async fn get_chain_id(&self) -> Result<Option<ChainId>, Error>;

    async fn get_account(&self) -> Result<Option<Address>, Error>;

    fn deactivate(&self);
}
