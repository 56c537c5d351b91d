use alloy_primitives::utils::format_ether;
use mg_api_types::{Notification, NotificationKind};
use mg_session::{CannotMintReason, MintWidget, Session};
use std::fmt::Write;

pub fn session(session: &Session, token_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {token_name} ==");

    if let Some(error) = &session.last_error {
        let _ = writeln!(out, "error: {}", error.plain_text());
    }
    if !session.can_connect() {
        return out;
    }

    match (&session.connected_address, &session.network) {
        (Some(address), Some(network)) => {
            let _ = writeln!(out, "account:  {address}");
            let _ = writeln!(
                out,
                "network:  {} (chain {}, {})",
                session.network_config.display_name, network.chain_id, network.name
            );
        }
        _ => {
            let _ = writeln!(out, "wallet not connected, run `mint-console connect`");
            return out;
        }
    }
    if session.is_not_mainnet() {
        let _ = writeln!(
            out,
            "note:     {} is a test network, tokens minted here have no value",
            session.network_config.display_name
        );
    }
    if !session.is_contract_ready() {
        return out;
    }

    let snapshot = &session.snapshot;
    let _ = writeln!(out, "contract: {}", session.contract_url());
    let _ = writeln!(
        out,
        "supply:   {}/{}",
        snapshot.total_supply, snapshot.max_supply
    );
    if session.is_sold_out() {
        let _ = writeln!(out, "status:   sold out");
        return out;
    }

    if let Some(props) = session.mint_widget_props() {
        out.push_str(&widget(&MintWidget::new(props)));
    }
    out
}

pub fn widget(widget: &MintWidget) -> String {
    let props = widget.props();
    let mut out = String::new();
    let _ = writeln!(out, "sale:     {}", widget.sale_status().label());
    let _ = writeln!(
        out,
        "price:    {} ETH (max {} per transaction)",
        format_ether(props.unit_price),
        props.max_mint_per_tx
    );
    if let Some(total) = widget.total_price() {
        let _ = writeln!(
            out,
            "order:    {} for {} ETH",
            widget.quantity(),
            format_ether(total)
        );
    }
    if let Some(reason) = widget.cannot_mint_reason() {
        let _ = writeln!(out, "blocked:  {}", cannot_mint(reason));
    }
    if props.loading {
        let _ = writeln!(out, "busy:     waiting for the wallet...");
    }
    out
}

pub fn cannot_mint(reason: CannotMintReason) -> &'static str {
    match reason {
        CannotMintReason::Paused => "the contract is paused",
        CannotMintReason::NotAllowlisted => "you are not included in the whitelist",
    }
}

pub fn notification(notification: &Notification) -> String {
    let tag = match notification.kind {
        NotificationKind::Info => "info",
        NotificationKind::Success => "success",
    };
    match &notification.link {
        Some(link) => format!("[{tag}] {} {}: {}", notification.message, link.label, link.url),
        None => format!("[{tag}] {}", notification.message),
    }
}
