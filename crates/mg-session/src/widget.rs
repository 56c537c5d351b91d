//! View state of the mint control: the chosen quantity and what it may do.

use mg_api_types::{MintPath, TxReceipt, U256};
use serde::Serialize;

use crate::controller::SessionController;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintWidgetProps {
    pub max_supply: u64,
    pub total_supply: u64,
    pub unit_price: U256,
    pub max_mint_per_tx: u64,
    pub is_paused: bool,
    pub allowlist_mint_enabled: bool,
    pub caller_allowlisted: bool,
    pub loading: bool,
}

impl MintWidgetProps {
    pub fn from_session(session: &Session) -> Self {
        let snapshot = &session.snapshot;
        Self {
            max_supply: snapshot.max_supply,
            total_supply: snapshot.total_supply,
            unit_price: snapshot.unit_price,
            max_mint_per_tx: snapshot.max_mint_per_tx,
            is_paused: snapshot.is_paused,
            allowlist_mint_enabled: snapshot.allowlist_mint_enabled,
            caller_allowlisted: snapshot.caller_allowlisted,
            loading: session.loading,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CannotMintReason {
    Paused,
    NotAllowlisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    PublicSale,
    AllowlistOnly,
    Paused,
}

impl SaleStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::PublicSale => "Public sale",
            Self::AllowlistOnly => "Whitelist only",
            Self::Paused => "Paused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintWidget {
    props: MintWidgetProps,
    quantity: u64,
}

impl MintWidget {
    pub fn new(props: MintWidgetProps) -> Self {
        Self { props, quantity: 1 }
    }

    pub fn props(&self) -> &MintWidgetProps {
        &self.props
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// New props from the controller; the quantity is pulled back into range.
    pub fn set_props(&mut self, props: MintWidgetProps) {
        self.props = props;
        self.quantity = self.quantity.clamp(1, self.max_quantity());
    }

    // A contract that reports 0 still lets the user pick one token.
    fn max_quantity(&self) -> u64 {
        self.props.max_mint_per_tx.max(1)
    }

    pub fn increment(&mut self) {
        if self.quantity < self.max_quantity() {
            self.quantity += 1;
        }
    }

    pub fn decrement(&mut self) {
        if self.quantity > 1 {
            self.quantity -= 1;
        }
    }

    pub fn can_allowlist_mint(&self) -> bool {
        self.props.allowlist_mint_enabled && self.props.caller_allowlisted
    }

    pub fn can_mint_now(&self) -> bool {
        !self.props.is_paused || self.can_allowlist_mint()
    }

    /// Public sale wins whenever it is open, even for allow-listed callers.
    pub fn mint_path(&self) -> MintPath {
        if self.props.is_paused {
            MintPath::Allowlist
        } else {
            MintPath::Standard
        }
    }

    pub fn cannot_mint_reason(&self) -> Option<CannotMintReason> {
        if self.can_mint_now() {
            return None;
        }
        Some(if self.props.allowlist_mint_enabled {
            CannotMintReason::NotAllowlisted
        } else {
            CannotMintReason::Paused
        })
    }

    pub fn sale_status(&self) -> SaleStatus {
        match (self.props.is_paused, self.props.allowlist_mint_enabled) {
            (false, _) => SaleStatus::PublicSale,
            (true, true) => SaleStatus::AllowlistOnly,
            (true, false) => SaleStatus::Paused,
        }
    }

    pub fn controls_enabled(&self) -> bool {
        !self.props.loading
    }

    pub fn total_price(&self) -> Option<U256> {
        self.props.unit_price.checked_mul(U256::from(self.quantity))
    }

    pub async fn mint(&self, controller: &SessionController) -> Option<TxReceipt> {
        controller.submit_mint(self.quantity, self.mint_path()).await
    }
}
