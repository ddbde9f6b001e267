use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use async_trait::async_trait;
use gloo_utils::errors::JsError;
use js_sys::{Function, Object, Promise, Reflect};
use log::error;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::{
    event::{EventName, ProviderEvent},
    provider::{
        Capabilities, InjectedProvider, Listener, ProviderHandle, ProviderLocator,
        ProviderProperty,
    },
    rpc::{error_code, ProviderError, RequestArguments},
};

pub const TOKENPOCKET_SLOT: &[&str] = &["tokenpocket", "ethereum"];
pub const ETHEREUM_SLOT: &[&str] = &["ethereum"];

type JsListener = Closure<dyn FnMut(JsValue, JsValue)>;

/// Walks `path` from `root`. Stops at the first `undefined` or `null`.
fn get_path(root: &JsValue, path: &[&str]) -> Option<JsValue> {
    path.iter()
        .try_fold(root.clone(), |value, key| {
            if value.is_undefined() || value.is_null() {
                return None;
            }
            Reflect::get(&value, &JsValue::from_str(key)).ok()
        })
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn to_json(value: JsValue) -> Result<Value, ProviderError> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// Maps a rejection to a [`ProviderError`], keeping the `code` of EIP-1193
/// error objects whether it is a number or a numeric string.
fn provider_error(err: JsValue) -> ProviderError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|code| to_json(code).ok())
        .as_ref()
        .and_then(error_code);
    if let Some(code) = code {
        let message = Reflect::get(&err, &JsValue::from_str("message"))
            .ok()
            .and_then(|message| message.as_string())
            .unwrap_or_default();
        return ProviderError::rpc(code, message);
    }
    match JsError::try_from(err) {
        Ok(err) => ProviderError::Js(err.to_string()),
        Err(err) => ProviderError::Js(err.to_string()),
    }
}

/// Awaits `value` if it is a promise, otherwise takes it as-is.
async fn settle(value: JsValue) -> Result<Value, ProviderError> {
    let value = JsFuture::from(Promise::resolve(&value)).await.map_err(provider_error)?;
    to_json(value)
}

/// A provider object found on the page.
pub struct WindowProvider {
    inner: JsValue,
    closures: RefCell<HashMap<u64, JsListener>>,
}

impl WindowProvider {
    pub fn new(inner: JsValue) -> Self {
        Self { inner, closures: RefCell::new(HashMap::new()) }
    }

    fn member(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.inner, &JsValue::from_str(name)).ok()?.dyn_into::<Function>().ok()
    }
}

impl fmt::Debug for WindowProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowProvider")
            .field("capabilities", &self.capabilities())
            .field("listeners", &self.closures.borrow().len())
            .finish()
    }
}

#[async_trait(?Send)]
impl InjectedProvider for WindowProvider {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            request: self.member("request").is_some(),
            enable: self.member("enable").is_some(),
            on: self.member("on").is_some(),
            remove_listener: self.member("removeListener").is_some(),
        }
    }

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        let request = self.member("request").ok_or(ProviderError::MissingMember("request"))?;
        let args = args.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?;
        let pending = request.call1(&self.inner, &args).map_err(provider_error)?;
        settle(pending).await
    }

    async fn enable(&self) -> Result<Value, ProviderError> {
        let enable = self.member("enable").ok_or(ProviderError::MissingMember("enable"))?;
        let pending = enable.call0(&self.inner).map_err(provider_error)?;
        settle(pending).await
    }

    fn on(&self, event: EventName, listener: Listener) {
        let Some(on) = self.member("on") else {
            return;
        };
        let id = listener.id();
        let closure = JsListener::new(move |first: JsValue, second: JsValue| {
            let args = [first, second]
                .into_iter()
                .map(|arg| to_json(arg).unwrap_or(Value::Null))
                .collect::<Vec<_>>();
            listener.call(ProviderEvent::decode(event, &args));
        });
        let name = JsValue::from_str(&event.to_string());
        if let Err(err) = on.call2(&self.inner, &name, closure.as_ref()) {
            error!("Failed to register '{event}' listener: {}", provider_error(err));
            return;
        }
        self.closures.borrow_mut().insert(id, closure);
    }

    fn remove_listener(&self, event: EventName, listener: &Listener) {
        let Some(closure) = self.closures.borrow_mut().remove(&listener.id()) else {
            return;
        };
        let Some(remove) = self.member("removeListener") else {
            return;
        };
        let name = JsValue::from_str(&event.to_string());
        if let Err(err) = remove.call2(&self.inner, &name, closure.as_ref()) {
            error!("Failed to remove '{event}' listener: {}", provider_error(err));
        }
    }

    fn property(&self, property: ProviderProperty) -> Option<Value> {
        to_json(get_path(&self.inner, property.path())?).ok()
    }

    fn disable_auto_refresh(&self) {
        let key = JsValue::from_str("autoRefreshOnNetworkChange");
        if let Err(err) = Reflect::set(&self.inner, &key, &JsValue::FALSE) {
            error!("Failed to disable auto refresh: {}", provider_error(err));
        }
    }
}

/// Looks the provider up on the JS global object.
///
/// The [`WindowProvider`] is reused as long as the slot holds the same JS
/// object, so listeners registered through one lookup can be removed through
/// a later one.
#[derive(Debug)]
pub struct WindowLocator {
    path: &'static [&'static str],
    cached: RefCell<Option<Rc<WindowProvider>>>,
}

impl WindowLocator {
    pub fn new(path: &'static [&'static str]) -> Self {
        Self { path, cached: RefCell::new(None) }
    }

    pub fn tokenpocket() -> Self {
        Self::new(TOKENPOCKET_SLOT)
    }

    pub fn ethereum() -> Self {
        Self::new(ETHEREUM_SLOT)
    }
}

impl ProviderLocator for WindowLocator {
    fn locate(&self) -> Option<ProviderHandle> {
        let global: JsValue = js_sys::global().into();
        let current = get_path(&global, self.path)?;

        let mut cached = self.cached.borrow_mut();
        if let Some(provider) = cached.as_ref().filter(|p| Object::is(&p.inner, &current)) {
            let handle: ProviderHandle = provider.clone();
            return Some(handle);
        }
        let provider = Rc::new(WindowProvider::new(current));
        *cached = Some(provider.clone());
        let handle: ProviderHandle = provider;
        Some(handle)
    }

    fn slot(&self) -> String {
        format!("window.{}", self.path.join("."))
    }
}
