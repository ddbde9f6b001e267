pub mod config;
pub mod connector;
pub mod diagnostics;
pub mod domain;
pub mod event;
pub mod provider;
pub mod rpc;
pub mod window;

use std::{cell::RefCell, rc::Rc};

use self::{
    config::ConnectorConfig,
    connector::{ActivationResult, Connector},
    diagnostics::{Diagnostics, Fallback, LogDiagnostics},
    domain::{parse_address, ChainId},
    event::{ConnectorUpdate, Event, EventName, ProviderEvent},
    provider::{Listener, ProviderHandle, ProviderLocator, ProviderProperty},
    rpc::{first_entry, is_present, unwrap_result, Method, ProviderError},
    window::WindowLocator,
};

use async_trait::async_trait;
use ethers::types::Address;
use serde_json::Value;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Inactive,
    Activating,
    Active,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No injected provider was found on {0}")]
    ProviderUnavailable(String),

    #[error("The user rejected the request.")]
    UserRejected,

    #[error(transparent)]
    Config(#[from] serde_wasm_bindgen::Error),
}

/// Listeners added to a provider, kept with the provider they were added to.
struct Registration {
    provider: ProviderHandle,
    listeners: Vec<(EventName, Listener)>,
}

/// State reachable from provider callbacks.
struct Shared {
    state: RefCell<State>,
    registration: RefCell<Option<Registration>>,
    listener: Option<Box<dyn Fn(Event)>>,
}

impl Shared {
    fn notify(&self, event: Event) {
        if let Some(l) = &self.listener {
            l(event);
        }
    }

    fn end_session(&self) {
        *self.state.borrow_mut() = State::Inactive;
        self.notify(Event::Deactivate);
    }

    fn relay<L: ProviderLocator>(&self, locator: &L, event: ProviderEvent) {
        debug!("Handling '{}' event with payload {:?}", event.name(), event);
        match event {
            ProviderEvent::ChainChanged { chain_id } => {
                self.notify(Event::Update(ConnectorUpdate {
                    provider: locator.locate(),
                    chain_id,
                    account: None,
                }));
            }
            ProviderEvent::NetworkChanged { network_id } => {
                self.notify(Event::Update(ConnectorUpdate {
                    provider: locator.locate(),
                    chain_id: network_id,
                    account: None,
                }));
            }
            ProviderEvent::AccountsChanged { accounts } => match accounts.first() {
                Some(Some(account)) => self.notify(Event::Update(ConnectorUpdate {
                    account: Some(*account),
                    ..Default::default()
                })),
                Some(None) => warn!("Ignoring account change without a readable first account"),
                None => self.end_session(),
            },
            ProviderEvent::Closed { .. } => self.end_session(),
        }
    }
}

/// Connector for a wallet that injects an EIP-1193 provider into the page.
pub struct InjectedConnector<L: ProviderLocator + 'static = WindowLocator> {
    locator: Rc<L>,
    config: ConnectorConfig,
    diagnostics: Box<dyn Diagnostics>,
    shared: Rc<Shared>,
}

impl InjectedConnector<WindowLocator> {
    /// TokenPocket, injected at `window.tokenpocket.ethereum`.
    pub fn tokenpocket(config: ConnectorConfig, listener: Option<Box<dyn Fn(Event)>>) -> Self {
        Self::new(WindowLocator::tokenpocket(), config, listener)
    }

    /// MetaMask and compatible wallets, injected at `window.ethereum`.
    pub fn injected(config: ConnectorConfig, listener: Option<Box<dyn Fn(Event)>>) -> Self {
        Self::new(WindowLocator::ethereum(), config, listener)
    }
}

impl<L: ProviderLocator + 'static> InjectedConnector<L> {
    pub fn new(locator: L, config: ConnectorConfig, listener: Option<Box<dyn Fn(Event)>>) -> Self {
        Self {
            locator: Rc::new(locator),
            config,
            diagnostics: Box::new(LogDiagnostics),
            shared: Rc::new(Shared {
                state: RefCell::new(State::Inactive),
                registration: RefCell::new(None),
                listener,
            }),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        *self.shared.state.borrow()
    }

    fn locate(&self) -> Result<ProviderHandle, Error> {
        self.locator.locate().ok_or_else(|| Error::ProviderUnavailable(self.locator.slot()))
    }

    fn register(&self, provider: &ProviderHandle) {
        let listeners: Vec<_> = EventName::ALL
            .into_iter()
            .map(|event| {
                let shared = Rc::downgrade(&self.shared);
                let locator = Rc::downgrade(&self.locator);
                let listener = Listener::new(move |payload| {
                    if let (Some(shared), Some(locator)) = (shared.upgrade(), locator.upgrade()) {
                        shared.relay(&*locator, payload);
                    }
                });
                provider.on(event, listener.clone());
                (event, listener)
            })
            .collect();
        *self.shared.registration.borrow_mut() =
            Some(Registration { provider: provider.clone(), listeners });
    }

    /// Removes the listeners from the provider they were added to. Nothing is
    /// removed once the global slot is empty.
    fn unregister(&self) {
        let Some(Registration { provider, listeners }) = self.shared.registration.take() else {
            return;
        };
        if self.locator.locate().is_none() || !provider.capabilities().remove_listener {
            return;
        }
        for (event, listener) in &listeners {
            provider.remove_listener(*event, listener);
        }
    }

    async fn request(provider: &ProviderHandle, method: Method) -> Result<Value, ProviderError> {
        if !provider.capabilities().request {
            return Err(ProviderError::MissingMember("request"));
        }
        provider.request(method.into()).await.map_err(|err| {
            debug!("{method} failed: {err}");
            err
        })
    }

    async fn request_account(
        provider: &ProviderHandle,
        method: Method,
    ) -> Result<Option<Address>, ProviderError> {
        let response = Self::request(provider, method).await?;
        Ok(first_entry(response).as_ref().and_then(parse_address))
    }

    async fn enable_account(&self, provider: &ProviderHandle) -> Option<Address> {
        let response = if provider.capabilities().enable {
            provider.enable().await
        } else {
            Err(ProviderError::MissingMember("enable"))
        };
        match response {
            Ok(response) => first_entry(response).as_ref().and_then(parse_address),
            Err(err) => {
                debug!("enable failed: {err}");
                self.diagnostics.fallback(Fallback::EnableFailed);
                None
            }
        }
    }

    async fn request_chain_id(
        provider: &ProviderHandle,
        method: Method,
    ) -> Result<Option<ChainId>, ProviderError> {
        let response = Self::request(provider, method).await?;
        Ok(ChainId::from_value(&unwrap_result(response)))
    }
}

/// Chain id from the fields providers set on themselves.
fn chain_id_from_properties(provider: &ProviderHandle) -> Option<ChainId> {
    let read = |property: ProviderProperty| {
        provider.property(property).and_then(|value| ChainId::from_value(&value))
    };

    if provider.property(ProviderProperty::IsDapper).as_ref().is_some_and(is_present) {
        return read(ProviderProperty::DapperNetVersion);
    }
    [ProviderProperty::ChainId, ProviderProperty::NetworkVersion, ProviderProperty::CachedChainId]
        .into_iter()
        .find_map(read)
}

#[async_trait(?Send)]
impl<L: ProviderLocator + 'static> Connector for InjectedConnector<L> {
    async fn activate(&self) -> Result<ActivationResult, Error> {
        let provider = self.locate()?;
        let capabilities = provider.capabilities();

        // A repeated activation replaces the previous registration.
        self.unregister();
        if capabilities.on {
            self.register(&provider);
        }
        *self.shared.state.borrow_mut() = State::Activating;

        if provider.property(ProviderProperty::IsMetaMask).as_ref().is_some_and(is_present) {
            provider.disable_auto_refresh();
        }

        let mut account = match Self::request_account(&provider, Method::RequestAccounts).await {
            Ok(account) => account,
            Err(err) if err.is_user_rejection() => {
                self.deactivate();
                return Err(Error::UserRejected);
            }
            Err(_) => {
                self.diagnostics.fallback(Fallback::RequestAccountsToEnable);
                None
            }
        };
        if account.is_none() {
            account = self.enable_account(&provider).await;
        }

        {
            // A deactivation signal may have arrived while we were waiting.
            let mut state = self.shared.state.borrow_mut();
            if *state == State::Activating {
                *state = State::Active;
            }
        }

        Ok(ActivationResult { provider, account })
    }

    fn get_provider(&self) -> Option<ProviderHandle> {
        self.locator.locate()
    }

    async fn get_chain_id(&self) -> Result<Option<ChainId>, Error> {
        let provider = self.locate()?;

        match Self::request_chain_id(&provider, Method::ChainId).await {
            Ok(Some(chain_id)) => return Ok(Some(chain_id)),
            Ok(None) => {}
            Err(_) => self.diagnostics.fallback(Fallback::ChainIdToNetVersion),
        }
        match Self::request_chain_id(&provider, Method::NetVersion).await {
            Ok(Some(chain_id)) => return Ok(Some(chain_id)),
            Ok(None) => {}
            Err(_) => self.diagnostics.fallback(Fallback::NetVersionToProperties),
        }

        Ok(chain_id_from_properties(&provider))
    }

    async fn get_account(&self) -> Result<Option<Address>, Error> {
        let provider = self.locate()?;

        match Self::request_account(&provider, Method::Accounts).await {
            Ok(Some(account)) => return Ok(Some(account)),
            Ok(None) => {}
            Err(_) => self.diagnostics.fallback(Fallback::AccountsToEnable),
        }

        Ok(self.enable_account(&provider).await)
    }

    fn deactivate(&self) {
        self.unregister();
        *self.shared.state.borrow_mut() = State::Inactive;
    }
}
