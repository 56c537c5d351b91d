use async_trait::async_trait;
use mg_api_types::{Bytes, U256};
use mg_chain_client::{ClientError, ProviderError};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use crate::transport::RpcTransport;

/// Transport that replays canned responses in order and records every call.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: RefCell<VecDeque<(String, Result<Value, ClientError>)>>,
    calls: RefCell<Vec<(String, Value)>>,
    delays: Cell<usize>,
}

impl ScriptedTransport {
    pub(crate) fn respond(&self, method: &str, result: Value) {
        self.script
            .borrow_mut()
            .push_back((method.to_owned(), Ok(result)));
    }

    pub(crate) fn fail(&self, method: &str, error: ProviderError) {
        self.script
            .borrow_mut()
            .push_back((method.to_owned(), Err(ClientError::from_provider(error))));
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().clone()
    }

    pub(crate) fn delays(&self) -> usize {
        self.delays.get()
    }
}

#[async_trait(?Send)]
impl RpcTransport for ScriptedTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        self.calls.borrow_mut().push((method.to_owned(), params));
        let Some((expected, result)) = self.script.borrow_mut().pop_front() else {
            return Err(ClientError::Transport(format!("unscripted call to {method}")));
        };
        if expected != method {
            return Err(ClientError::Transport(format!(
                "expected {expected}, got {method}"
            )));
        }
        result
    }

    async fn delay(&self, _duration: Duration) {
        self.delays.set(self.delays.get() + 1);
    }
}

pub(crate) fn word_u256(value: U256) -> Value {
    json!(Bytes::from(value.to_be_bytes::<32>().to_vec()))
}

pub(crate) fn word_bool(value: bool) -> Value {
    word_u256(U256::from(u8::from(value)))
}
