use std::{
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use serde_json::Value;

use super::{
    event::{EventName, ProviderEvent},
    rpc::{ProviderError, RequestArguments},
};

/// Shared handle to an injected provider, surfaced to callers as-is.
pub type ProviderHandle = Rc<dyn InjectedProvider>;

/// Members an injected provider actually exposes.
///
/// Wallet extensions ship different subsets of the EIP-1193 surface, so the
/// connector checks these before calling rather than relying on a call to
/// fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub request: bool,
    pub enable: bool,
    pub on: bool,
    pub remove_listener: bool,
}

impl Capabilities {
    pub const FULL: Self = Self { request: true, enable: true, on: true, remove_listener: true };
    pub const NONE: Self =
        Self { request: false, enable: false, on: false, remove_listener: false };
}

/// Ad hoc fields some providers expose directly on the provider object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderProperty {
    /// `chainId`
    ChainId,
    /// `networkVersion`
    NetworkVersion,
    /// `_chainId`, a private cache kept by some legacy providers.
    CachedChainId,
    /// `isMetaMask`
    IsMetaMask,
    /// `isDapper`
    IsDapper,
    /// `cachedResults.net_version`, only set by Dapper.
    DapperNetVersion,
}

impl ProviderProperty {
    /// Property path on the JS object.
    pub fn path(&self) -> &'static [&'static str] {
        match self {
            Self::ChainId => &["chainId"],
            Self::NetworkVersion => &["networkVersion"],
            Self::CachedChainId => &["_chainId"],
            Self::IsMetaMask => &["isMetaMask"],
            Self::IsDapper => &["isDapper"],
            Self::DapperNetVersion => &["cachedResults", "net_version"],
        }
    }
}

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// A callback registered with the provider. Identity is the `id`, so the
/// exact registration can be handed back to `remove_listener`.
#[derive(Clone)]
pub struct Listener {
    id: u64,
    callback: Rc<dyn Fn(ProviderEvent)>,
}

impl Listener {
    pub fn new(callback: impl Fn(ProviderEvent) + 'static) -> Self {
        Self { id: NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed), callback: Rc::new(callback) }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn call(&self, event: ProviderEvent) {
        (self.callback)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}

/// The provider object a wallet extension injects into the page.
///
/// Calls to members missing from [`InjectedProvider::capabilities`] are not
/// made by the connector. Implementations still have to answer them, the
/// defaults report the member as missing or do nothing.
#[async_trait(?Send)]
pub trait InjectedProvider: fmt::Debug {
    fn capabilities(&self) -> Capabilities;

    /// EIP-1193 `request({ method, params })`. Returns the raw response.
    async fn request(&self, _args: RequestArguments) -> Result<Value, ProviderError> {
        Err(ProviderError::MissingMember("request"))
    }

    /// Legacy EIP-1102 `enable()`. Returns the raw response.
    async fn enable(&self) -> Result<Value, ProviderError> {
        Err(ProviderError::MissingMember("enable"))
    }

    fn on(&self, _event: EventName, _listener: Listener) {}

    fn remove_listener(&self, _event: EventName, _listener: &Listener) {}

    /// Reads an ad hoc field. `None` when the field is unset.
    fn property(&self, _property: ProviderProperty) -> Option<Value> {
        None
    }

    /// MetaMask reloads the page on network change unless told otherwise.
    fn disable_auto_refresh(&self) {}
}

/// Finds the provider in its well-known global slot.
pub trait ProviderLocator {
    /// The provider if the slot is populated. Never calls into the provider.
    fn locate(&self) -> Option<ProviderHandle>;

    /// Human readable name of the slot, e.g. `window.tokenpocket`.
    fn slot(&self) -> String;
}
