//! Browser front-end for the mint dapp.
//!
//! Binds `window.ethereum` through `Eip1193Transport`, drives a
//! `SessionController` on the page's event loop and re-renders the DOM on
//! every state change.

pub mod dom;
pub mod eip1193;
pub mod events;
pub mod host;
pub mod render;
pub mod state;

use mg_allowlist::Allowlist;
use mg_network_config::CollectionConfig;
use mg_session::{ChannelNotifier, SessionConfig, SessionController};
use std::rc::Rc;
use tokio::sync::mpsc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

const COLLECTION_CONFIG: &str = include_str!("../../../config/collection.json");

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    let collection = CollectionConfig::from_json(COLLECTION_CONFIG).map_err(js_error)?;
    let config = SessionConfig {
        networks: collection.network_table().map_err(js_error)?,
        allowlist: Allowlist::new(&collection.allowlist).map_err(js_error)?,
        accept_any_provider: false,
    };
    dom::document().set_title(&collection.token_name);

    let (notify_tx, mut notifications) = mpsc::unbounded_channel();
    let controller = Rc::new(SessionController::new(
        config,
        Rc::new(ChannelNotifier::new(notify_tx)),
    ));
    state::install(Rc::clone(&controller));

    // Re-render on every state change.
    {
        let els = els.clone();
        let mut changes = controller.on_state_change();
        render::session(&els, &changes.borrow_and_update());
        spawn_local(async move {
            while changes.changed().await.is_ok() {
                let session = changes.borrow_and_update().clone();
                render::session(&els, &session);
            }
        });
    }

    {
        let els = els.clone();
        spawn_local(async move {
            while let Some(notification) = notifications.recv().await {
                if let Err(err) = render::toast(&els, &notification) {
                    gloo_console::error!(err);
                }
            }
        });
    }

    events::bind_events(&els)?;

    controller.initialize(Rc::new(host::BrowserHost)).await;
    spawn_local(async move {
        controller.pump_events().await;
    });

    Ok(())
}
