//! DOM element bindings. All fields are resolved once at startup.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlAnchorElement, HtmlButtonElement, HtmlElement, HtmlInputElement};

pub fn window() -> web_sys::Window {
    web_sys::window().expect_throw("no window")
}

pub fn document() -> Document {
    window().document().expect_throw("no document")
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document().create_element(tag)
}

fn required<T: JsCast>(id: &str) -> Result<T, JsValue> {
    document()
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has the wrong element type")))
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn set_visible(el: &Element, visible: bool) {
    let _ = el.class_list().toggle_with_force("hidden", !visible);
}

pub fn set_enabled(el: &HtmlButtonElement, enabled: bool) {
    el.set_disabled(!enabled);
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

#[derive(Clone)]
pub struct Elements {
    // Wallet
    pub connect_btn: HtmlButtonElement,
    pub wallet_panel: Element,
    pub wallet_address: Element,
    pub network_name: Element,
    pub testnet_notice: Element,

    // Errors
    pub error_box: Element,
    pub error_content: HtmlElement,
    pub dismiss_error_btn: HtmlButtonElement,

    // Collection
    pub collection_panel: Element,
    pub supply_label: Element,
    pub contract_link: HtmlAnchorElement,
    pub sold_out: Element,

    // Mint widget
    pub mint_widget: Element,
    pub sale_status: Element,
    pub price_label: Element,
    pub quantity_label: Element,
    pub total_label: Element,
    pub decrement_btn: HtmlButtonElement,
    pub increment_btn: HtmlButtonElement,
    pub mint_btn: HtmlButtonElement,
    pub cannot_mint: Element,
    pub loading: Element,

    // Manual proof tool
    pub proof_input: HtmlInputElement,
    pub proof_btn: HtmlButtonElement,
    pub proof_result: Element,

    pub toasts: Element,
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            connect_btn: required("connectWallet")?,
            wallet_panel: required("walletPanel")?,
            wallet_address: required("walletAddress")?,
            network_name: required("networkName")?,
            testnet_notice: required("testnetNotice")?,
            error_box: required("errorBox")?,
            error_content: required("errorContent")?,
            dismiss_error_btn: required("dismissError")?,
            collection_panel: required("collectionPanel")?,
            supply_label: required("supply")?,
            contract_link: required("contractLink")?,
            sold_out: required("soldOut")?,
            mint_widget: required("mintWidget")?,
            sale_status: required("saleStatus")?,
            price_label: required("price")?,
            quantity_label: required("quantity")?,
            total_label: required("total")?,
            decrement_btn: required("decrement")?,
            increment_btn: required("increment")?,
            mint_btn: required("mint")?,
            cannot_mint: required("cannotMint")?,
            loading: required("loading")?,
            proof_input: required("proofAddress")?,
            proof_btn: required("proofLookup")?,
            proof_result: required("proofResult")?,
            toasts: required("toasts")?,
        })
    }
}
