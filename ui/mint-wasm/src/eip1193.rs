//! `window.ethereum` as an `RpcTransport`.
//!
//! Requests go through `ethereum.request({ method, params })`; account and
//! chain notifications are registered with `ethereum.on(...)` and forwarded
//! into an unbounded channel.

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use mg_api_types::{Address, ChainId};
use mg_chain_client::{ClientError, ProviderError, ProviderEvent};
use mg_chain_jsonrpc::RpcTransport;
use serde::Serialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

// Providers nest errors at most a couple of levels deep.
const MAX_ERROR_DEPTH: usize = 4;

pub struct Eip1193Transport {
    ethereum: JsValue,
    subscribed: Cell<bool>,
    listeners: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

impl Eip1193Transport {
    /// Injected provider of the current window, if any.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self {
            ethereum,
            subscribed: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn method(&self, name: &str) -> Result<Function, ClientError> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| ClientError::Transport(format!("window.ethereum.{name} is not a function")))
    }

    fn listen(&self, event: &str, events: UnboundedSender<ProviderEvent>, map: fn(JsValue) -> Option<ProviderEvent>) {
        let Ok(on) = self.method("on") else {
            gloo_console::warn!("wallet provider does not support events");
            return;
        };
        let callback = Closure::wrap(Box::new(move |payload: JsValue| {
            if let Some(event) = map(payload) {
                let _ = events.send(event);
            }
        }) as Box<dyn FnMut(JsValue)>);

        if on
            .call2(&self.ethereum, &JsValue::from_str(event), callback.as_ref().unchecked_ref())
            .is_err()
        {
            gloo_console::warn!(format!("could not subscribe to {event}"));
        }
        self.listeners.borrow_mut().push(callback);
    }
}

fn accounts_changed(payload: JsValue) -> Option<ProviderEvent> {
    let accounts: Vec<Address> = serde_wasm_bindgen::from_value(payload).ok()?;
    Some(ProviderEvent::AccountsChanged(accounts))
}

fn chain_changed(payload: JsValue) -> Option<ProviderEvent> {
    let raw = payload.as_string()?;
    ChainId::from_hex_quantity(&raw).map(ProviderEvent::ChainChanged)
}

fn provider_error(value: &JsValue, depth: usize) -> ProviderError {
    let field = |name: &str| Reflect::get(value, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED);

    let data = field("data");
    let nested = field("error");
    ProviderError {
        code: field("code").as_f64().map(|code| code as i64),
        message: field("message").as_string(),
        data: if data.is_undefined() || data.is_null() {
            None
        } else {
            serde_wasm_bindgen::from_value::<Value>(data).ok()
        },
        error: if depth < MAX_ERROR_DEPTH && nested.is_object() {
            Some(Box::new(provider_error(&nested, depth + 1)))
        } else {
            None
        },
    }
}

// Some wallets reject with a bare string; that string is the message.
fn js_error(method: &str, value: JsValue) -> ClientError {
    if value.is_object() {
        ClientError::from_provider(provider_error(&value, 0))
    } else if let Some(message) = value.as_string() {
        ClientError::from_provider(ProviderError {
            message: Some(message),
            ..ProviderError::default()
        })
    } else {
        ClientError::Transport(format!("{method}: {value:?}"))
    }
}

#[async_trait(?Send)]
impl RpcTransport for Eip1193Transport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let args = Object::new();
        let params = params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| ClientError::Transport(format!("{method} params: {err}")))?;
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .and_then(|_| Reflect::set(&args, &JsValue::from_str("params"), &params))
            .map_err(|err| js_error(method, err))?;

        let promise: Promise = self
            .method("request")?
            .call1(&self.ethereum, &args)
            .map_err(|err| js_error(method, err))?
            .dyn_into()
            .map_err(|_| ClientError::Transport(format!("{method}: request did not return a promise")))?;

        let result = JsFuture::from(promise)
            .await
            .map_err(|err| js_error(method, err))?;
        if result.is_undefined() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result)
            .map_err(|err| ClientError::Decode(format!("{method} response: {err}")))
    }

    fn is_metamask(&self) -> bool {
        Reflect::get(&self.ethereum, &JsValue::from_str("isMetaMask"))
            .ok()
            .and_then(|flag| flag.as_bool())
            .unwrap_or(false)
    }

    fn subscribe(&self) -> Option<UnboundedReceiver<ProviderEvent>> {
        if self.subscribed.replace(true) {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.listen("accountsChanged", tx.clone(), accounts_changed);
        self.listen("chainChanged", tx, chain_changed);
        Some(rx)
    }

    async fn delay(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::future::TimeoutFuture::new(millis).await;
    }
}
