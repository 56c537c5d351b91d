//! Session and widget to DOM.

use alloy_primitives::utils::format_ether;
use gloo_timers::callback::Timeout;
use mg_api_types::{Notification, NotificationKind};
use mg_session::{CannotMintReason, ErrorInfo, MintWidget, ProofFeedback, RichError, Session};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom::{self, Elements};
use crate::state;

const TOAST_TIMEOUT_MS: u32 = 5_000;

pub fn session(els: &Elements, session: &Session) {
    render_error(els, session.last_error.as_ref());

    dom::set_visible(&els.connect_btn, session.can_connect() && !session.is_wallet_connected());
    dom::set_enabled(&els.connect_btn, !session.loading);

    dom::set_visible(&els.wallet_panel, session.is_wallet_connected());
    match &session.connected_address {
        Some(address) => dom::set_text(&els.wallet_address, &address.to_string()),
        None => dom::set_text(&els.wallet_address, ""),
    }
    dom::set_text(&els.network_name, &session.network_config.display_name);
    dom::set_visible(&els.testnet_notice, session.is_not_mainnet());

    let show_collection = session.is_wallet_connected() && session.is_contract_ready();
    dom::set_visible(&els.collection_panel, show_collection);
    dom::set_text(
        &els.supply_label,
        &format!("{}/{}", session.snapshot.total_supply, session.snapshot.max_supply),
    );
    els.contract_link.set_href(&session.contract_url());
    dom::set_visible(&els.sold_out, show_collection && session.is_sold_out());

    let widget = state::sync_widget(session.mint_widget_props());
    dom::set_visible(&els.mint_widget, widget.is_some());
    if let Some(widget) = widget {
        mint_widget(els, &widget);
    }

    if let Some(feedback) = &session.manual_proof.feedback {
        proof(els, feedback);
    }
}

pub fn mint_widget(els: &Elements, widget: &MintWidget) {
    let props = widget.props();
    dom::set_text(&els.sale_status, widget.sale_status().label());
    dom::set_text(&els.price_label, &format!("{} ETH", format_ether(props.unit_price)));
    dom::set_text(&els.quantity_label, &widget.quantity().to_string());
    match widget.total_price() {
        Some(total) => dom::set_text(&els.total_label, &format!("{} ETH", format_ether(total))),
        None => dom::set_text(&els.total_label, "-"),
    }

    let can_mint = widget.can_mint_now();
    let enabled = widget.controls_enabled();
    for button in [&els.decrement_btn, &els.increment_btn, &els.mint_btn] {
        dom::set_visible(button, can_mint);
        dom::set_enabled(button, enabled);
    }
    dom::set_text(
        &els.mint_btn,
        if widget.mint_path() == mg_api_types::MintPath::Allowlist {
            "Whitelist mint"
        } else {
            "Mint"
        },
    );

    match widget.cannot_mint_reason() {
        Some(reason) => {
            dom::set_text(&els.cannot_mint, cannot_mint(reason));
            dom::set_visible(&els.cannot_mint, true);
        }
        None => dom::set_visible(&els.cannot_mint, false),
    }
    dom::set_visible(&els.loading, props.loading);
}

fn cannot_mint(reason: CannotMintReason) -> &'static str {
    match reason {
        CannotMintReason::Paused => "The contract is paused. Please come back during the next sale!",
        CannotMintReason::NotAllowlisted => {
            "You are not included in the whitelist. Please wait for the public sale."
        }
    }
}

fn render_error(els: &Elements, error: Option<&ErrorInfo>) {
    let Some(error) = error else {
        dom::set_visible(&els.error_box, false);
        return;
    };
    match error {
        ErrorInfo::Text(text) => dom::set_text(&els.error_content, text),
        ErrorInfo::Rich(RichError::ProviderNotFound {
            explorer_name,
            contract_url,
        }) => {
            let text = format!(
                "We were not able to detect MetaMask. You can still interact with the \
                 contract through {explorer_name}, and get your whitelist proof with the \
                 tool below. "
            );
            dom::set_text(&els.error_content, &text);
            if let Ok(link) = dom::create_element("a") {
                dom::set_text(&link, &format!("Open on {explorer_name}"));
                let _ = link.set_attribute("href", contract_url);
                let _ = link.set_attribute("target", "_blank");
                let _ = els.error_content.append_child(&link);
            }
        }
    }
    dom::set_visible(&els.error_box, true);
}

pub fn proof(els: &Elements, feedback: &ProofFeedback) {
    dom::set_text(&els.proof_result, &feedback.message());
    let _ = els
        .proof_result
        .class_list()
        .toggle_with_force("error", !matches!(feedback, ProofFeedback::Proof { .. }));
}

/// Append a toast that removes itself on click or after a few seconds.
pub fn toast(els: &Elements, notification: &Notification) -> Result<(), JsValue> {
    let toast = dom::create_element("div")?;
    let kind = match notification.kind {
        NotificationKind::Info => "info",
        NotificationKind::Success => "success",
    };
    toast.set_class_name(&format!("toast {kind}"));

    let message = dom::create_element("span")?;
    dom::set_text(&message, &notification.message);
    toast.append_child(&message)?;

    if let Some(link) = &notification.link {
        let anchor = dom::create_element("a")?;
        dom::set_text(&anchor, &link.label);
        anchor.set_attribute("href", &link.url)?;
        anchor.set_attribute("target", "_blank")?;
        toast.append_child(&anchor)?;
    }
    els.toasts.append_child(&toast)?;

    let on_click = {
        let toast = toast.clone();
        Closure::once_into_js(move || toast.remove())
    };
    toast.add_event_listener_with_callback("click", on_click.unchecked_ref())?;
    Timeout::new(TOAST_TIMEOUT_MS, move || toast.remove()).forget();
    Ok(())
}
