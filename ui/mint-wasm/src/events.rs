//! Event binding. Async handlers are spawned with `spawn_local`.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom::{self, Elements};
use crate::render;
use crate::state;

/// Attach an async click handler that gets the controller.
macro_rules! on_click_async {
    ($el:expr, $handler:expr) => {{
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            if let Some(controller) = state::controller() {
                wasm_bindgen_futures::spawn_local(async move {
                    $handler(controller).await;
                });
            }
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Attach a sync click handler.
macro_rules! on_click {
    ($el:expr, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::MouseEvent)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    on_click_async!(els.connect_btn, |controller: std::rc::Rc<mg_session::SessionController>| async move {
        controller.connect_wallet().await;
    });

    on_click!(els.dismiss_error_btn, move |_: web_sys::MouseEvent| {
        if let Some(controller) = state::controller() {
            controller.dismiss_error();
        }
    });

    {
        let els2 = els.clone();
        on_click!(els.increment_btn, move |_: web_sys::MouseEvent| {
            if let Some(widget) = state::with_widget(|widget| {
                widget.increment();
                widget.clone()
            }) {
                render::mint_widget(&els2, &widget);
            }
        });
    }
    {
        let els2 = els.clone();
        on_click!(els.decrement_btn, move |_: web_sys::MouseEvent| {
            if let Some(widget) = state::with_widget(|widget| {
                widget.decrement();
                widget.clone()
            }) {
                render::mint_widget(&els2, &widget);
            }
        });
    }

    on_click_async!(els.mint_btn, |controller: std::rc::Rc<mg_session::SessionController>| async move {
        let Some(widget) = state::with_widget(|widget| widget.clone()) else {
            return;
        };
        if widget.mint(&controller).await.is_some() {
            gloo_console::log!("mint confirmed");
        }
    });

    {
        let els2 = els.clone();
        on_click!(els.proof_btn, move |_: web_sys::MouseEvent| {
            if let Some(controller) = state::controller() {
                let feedback = controller.lookup_proof(&dom::get_input_value(&els2.proof_input));
                render::proof(&els2, &feedback);
            }
        });
    }

    Ok(())
}
