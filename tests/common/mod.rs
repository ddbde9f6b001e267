#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use async_trait::async_trait;
use injected_connector::{
    config::ConnectorConfig,
    diagnostics::{Diagnostics, Fallback},
    event::{Event, EventName, ProviderEvent},
    provider::{
        Capabilities, InjectedProvider, Listener, ProviderHandle, ProviderLocator,
        ProviderProperty,
    },
    rpc::{Method, ProviderError, RequestArguments},
    InjectedConnector,
};
use serde_json::Value;

pub const ACCOUNT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const OTHER_ACCOUNT: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";

/// Provider double that answers from canned responses and records every
/// call made to it.
#[derive(Debug)]
pub struct MockProvider {
    capabilities: Capabilities,
    responses: RefCell<HashMap<Method, Result<Value, ProviderError>>>,
    enable_response: RefCell<Option<Result<Value, ProviderError>>>,
    emit_on_request: RefCell<HashMap<Method, ProviderEvent>>,
    properties: RefCell<HashMap<ProviderProperty, Value>>,
    listeners: RefCell<Vec<(EventName, Listener)>>,
    calls: RefCell<Vec<String>>,
    added: Cell<usize>,
    removed: Cell<usize>,
    auto_refresh_disabled: Cell<bool>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::FULL)
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            responses: RefCell::new(HashMap::new()),
            enable_response: RefCell::new(None),
            emit_on_request: RefCell::new(HashMap::new()),
            properties: RefCell::new(HashMap::new()),
            listeners: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            added: Cell::new(0),
            removed: Cell::new(0),
            auto_refresh_disabled: Cell::new(false),
        }
    }

    pub fn respond(self, method: Method, response: Result<Value, ProviderError>) -> Self {
        self.responses.borrow_mut().insert(method, response);
        self
    }

    pub fn respond_enable(self, response: Result<Value, ProviderError>) -> Self {
        *self.enable_response.borrow_mut() = Some(response);
        self
    }

    pub fn set_property(self, property: ProviderProperty, value: Value) -> Self {
        self.properties.borrow_mut().insert(property, value);
        self
    }

    /// Fires `event` while `method` is being answered.
    pub fn emit_during(self, method: Method, event: ProviderEvent) -> Self {
        self.emit_on_request.borrow_mut().insert(method, event);
        self
    }

    pub fn emit(&self, event: ProviderEvent) {
        let name = event.name();
        let listeners = self
            .listeners
            .borrow()
            .iter()
            .filter(|(registered, _)| *registered == name)
            .map(|(_, listener)| listener.clone())
            .collect::<Vec<_>>();
        for listener in listeners {
            listener.call(event.clone());
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn added(&self) -> usize {
        self.added.get()
    }

    pub fn removed(&self) -> usize {
        self.removed.get()
    }

    pub fn auto_refresh_disabled(&self) -> bool {
        self.auto_refresh_disabled.get()
    }
}

#[async_trait(?Send)]
impl InjectedProvider for MockProvider {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        self.calls.borrow_mut().push(args.method.to_string());
        let event = self.emit_on_request.borrow_mut().remove(&args.method);
        if let Some(event) = event {
            self.emit(event);
        }
        self.responses
            .borrow()
            .get(&args.method)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::rpc(-32601, "method not found")))
    }

    async fn enable(&self) -> Result<Value, ProviderError> {
        self.calls.borrow_mut().push("enable".to_string());
        self.enable_response
            .borrow()
            .clone()
            .unwrap_or_else(|| Err(ProviderError::MissingMember("enable")))
    }

    fn on(&self, event: EventName, listener: Listener) {
        self.calls.borrow_mut().push(format!("on:{event}"));
        self.added.set(self.added.get() + 1);
        self.listeners.borrow_mut().push((event, listener));
    }

    fn remove_listener(&self, event: EventName, listener: &Listener) {
        self.calls.borrow_mut().push(format!("removeListener:{event}"));
        let mut listeners = self.listeners.borrow_mut();
        if let Some(index) =
            listeners.iter().position(|(name, registered)| *name == event && registered == listener)
        {
            listeners.remove(index);
            self.removed.set(self.removed.get() + 1);
        }
    }

    fn property(&self, property: ProviderProperty) -> Option<Value> {
        self.properties.borrow().get(&property).cloned()
    }

    fn disable_auto_refresh(&self) {
        self.auto_refresh_disabled.set(true);
    }
}

pub type Slot = Rc<RefCell<Option<Rc<MockProvider>>>>;

/// Locator over a slot the test can empty or refill at will.
pub struct MockLocator(pub Slot);

impl ProviderLocator for MockLocator {
    fn locate(&self) -> Option<ProviderHandle> {
        let provider = self.0.borrow().clone()?;
        let handle: ProviderHandle = provider;
        Some(handle)
    }

    fn slot(&self) -> String {
        "window.tokenpocket.ethereum".to_string()
    }
}

#[derive(Clone, Default)]
pub struct RecordingDiagnostics(Rc<RefCell<Vec<Fallback>>>);

impl RecordingDiagnostics {
    pub fn taken(&self) -> Vec<Fallback> {
        self.0.borrow().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn fallback(&self, fallback: Fallback) {
        self.0.borrow_mut().push(fallback);
    }
}

pub struct Harness {
    pub connector: InjectedConnector<MockLocator>,
    pub provider: Rc<MockProvider>,
    pub slot: Slot,
    pub events: Rc<RefCell<Vec<Event>>>,
    pub diagnostics: RecordingDiagnostics,
}

impl Harness {
    pub fn new(provider: MockProvider) -> Self {
        let provider = Rc::new(provider);
        let slot: Slot = Rc::new(RefCell::new(Some(provider.clone())));
        let events = Rc::new(RefCell::new(Vec::new()));
        let diagnostics = RecordingDiagnostics::default();

        let sink = events.clone();
        let connector = InjectedConnector::new(
            MockLocator(slot.clone()),
            ConnectorConfig::default(),
            Some(Box::new(move |event| sink.borrow_mut().push(event))),
        )
        .with_diagnostics(diagnostics.clone());

        Self { connector, provider, slot, events, diagnostics }
    }

    /// A connector whose slot is empty from the start.
    pub fn without_provider() -> Self {
        let harness = Self::new(MockProvider::new());
        harness.slot.borrow_mut().take();
        harness
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }
}
