//! Wallet/contract session state machine.
//!
//! `SessionController` is the only owner of the wallet provider, the bound
//! contract and the `Session` value. Every mutation goes through
//! `watch::Sender::send_modify`, which doubles as the re-render trigger for
//! whoever holds an `on_state_change` receiver. Borrows of the interior
//! cells are never held across an `.await`.
//!
//! Overlapping refreshes are not serialized; whichever finishes last wins.

use mg_allowlist::Allowlist;
use mg_api_types::{
    Address, ContractSnapshot, ExplorerLink, MintPath, Notification, NotificationKind, TxHash,
    TxReceipt, U256,
};
use mg_chain_client::{ClientError, MintContract, ProviderEvent, WalletProvider};
use mg_network_config::{NetworkConfig, NetworkTable};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::str::FromStr;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ErrorInfo, SessionError};
use crate::host::{HostEnvironment, Notifier};
use crate::session::{ProofFeedback, ProofLookup, Session};

pub struct SessionConfig {
    pub networks: NetworkTable,
    pub allowlist: Allowlist,
    /// Accept providers that do not identify as MetaMask (development nodes).
    pub accept_any_provider: bool,
}

pub struct SessionController {
    config: SessionConfig,
    notifier: Rc<dyn Notifier>,
    state: watch::Sender<Session>,
    host: RefCell<Option<Rc<dyn HostEnvironment>>>,
    provider: RefCell<Option<Rc<dyn WalletProvider>>>,
    contract: RefCell<Option<Rc<dyn MintContract>>>,
    events: RefCell<Option<UnboundedReceiver<ProviderEvent>>>,
    connecting: Cell<bool>,
}

/// Clears the in-flight flag even when the owning future is dropped.
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

fn read_failed(accessor: &'static str) -> impl FnOnce(ClientError) -> SessionError {
    move |source| SessionError::ReadFailed { accessor, source }
}

pub fn payment_for(unit_price: U256, quantity: u64) -> Result<U256, SessionError> {
    unit_price
        .checked_mul(U256::from(quantity))
        .ok_or(SessionError::PaymentOverflow { quantity })
}

impl SessionController {
    pub fn new(config: SessionConfig, notifier: Rc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(Session::new(config.networks.primary().clone()));
        Self {
            config,
            notifier,
            state,
            host: RefCell::new(None),
            provider: RefCell::new(None),
            contract: RefCell::new(None),
            events: RefCell::new(None),
            connecting: Cell::new(false),
        }
    }

    pub fn state(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn on_state_change(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn update(&self, modify: impl FnOnce(&mut Session)) {
        self.state.send_modify(modify);
    }

    fn set_error(&self, err: &SessionError) {
        warn!("session error: {}", err);
        let info = ErrorInfo::from_error(err, &self.state.borrow().network_config);
        self.update(|session| session.last_error = Some(info));
    }

    fn provider(&self) -> Option<Rc<dyn WalletProvider>> {
        self.provider.borrow().clone()
    }

    fn contract(&self) -> Option<Rc<dyn MintContract>> {
        self.contract.borrow().clone()
    }

    /// Mount: detect the wallet, subscribe to its notifications, connect.
    pub async fn initialize(&self, host: Rc<dyn HostEnvironment>) {
        *self.host.borrow_mut() = Some(Rc::clone(&host));

        let provider = match host.detect_provider().await {
            Some(provider) if self.config.accept_any_provider || provider.is_metamask() => provider,
            Some(_) => {
                debug!("injected provider is not MetaMask");
                self.set_error(&SessionError::ProviderNotFound);
                return;
            }
            None => {
                self.set_error(&SessionError::ProviderNotFound);
                return;
            }
        };

        info!("wallet provider detected");
        *self.events.borrow_mut() = provider.subscribe();
        *self.provider.borrow_mut() = Some(provider);
        self.update(|session| session.provider_available = true);

        self.refresh_session().await;
    }

    /// Ask the wallet for account access. Re-entrant calls are dropped.
    pub async fn connect_wallet(&self) {
        let Some(provider) = self.provider() else {
            debug!("connect requested without a provider");
            return;
        };
        if self.connecting.replace(true) {
            debug!("connect already in flight");
            return;
        }

        let result = {
            let _in_flight = InFlight(&self.connecting);
            provider.request_accounts().await
        };

        match result {
            Ok(_) => self.refresh_session().await,
            Err(err) => self.set_error(&SessionError::Provider(err)),
        }
    }

    /// Re-derive the whole session from the wallet.
    pub async fn refresh_session(&self) {
        let Some(provider) = self.provider() else {
            return;
        };

        *self.contract.borrow_mut() = None;
        let primary = self.config.networks.primary().clone();
        self.update(|session| session.reset(&primary));

        if let Err(err) = self.try_refresh_session(provider.as_ref()).await {
            self.set_error(&err);
        }
    }

    async fn try_refresh_session(&self, provider: &dyn WalletProvider) -> Result<(), SessionError> {
        let accounts = provider
            .list_accounts()
            .await
            .map_err(SessionError::Provider)?;
        let Some(&address) = accounts.first() else {
            debug!("wallet reports no accounts");
            return Ok(());
        };

        let network = provider.get_network().await.map_err(SessionError::Provider)?;
        let chain_id = network.chain_id;
        let network_config = self
            .config
            .networks
            .lookup(chain_id)
            .map_err(|_| SessionError::UnsupportedNetwork { chain_id })?
            .clone();
        let contract_address = network_config.contract_address;

        self.update(|session| {
            session.connected_address = Some(address);
            session.network = Some(network);
            session.network_config = network_config;
        });

        let code = provider
            .get_code(contract_address)
            .await
            .map_err(SessionError::Provider)?;
        if code.is_empty() {
            return Err(SessionError::ContractNotDeployed {
                address: contract_address,
                chain_id,
            });
        }

        *self.contract.borrow_mut() = Some(provider.contract(contract_address, address));
        self.update(|session| session.contract_ready = true);
        info!(%address, %chain_id, "wallet connected");

        self.refresh_contract_snapshot().await;
        Ok(())
    }

    /// Re-read the sale parameters and replace the snapshot in one step.
    pub async fn refresh_contract_snapshot(&self) {
        if let Err(err) = self.try_refresh_contract_snapshot().await {
            self.set_error(&err);
        }
    }

    async fn try_refresh_contract_snapshot(&self) -> Result<(), SessionError> {
        let Some(contract) = self.contract() else {
            debug!("snapshot refresh skipped, no contract bound");
            return Ok(());
        };

        let max_supply = contract.max_supply().await.map_err(read_failed("maxSupply"))?;
        let total_supply = contract
            .total_supply()
            .await
            .map_err(read_failed("totalSupply"))?;
        let max_mint_per_tx = contract
            .max_mint_amount_per_tx()
            .await
            .map_err(read_failed("maxMintAmountPerTx"))?;
        let unit_price = contract.cost().await.map_err(read_failed("cost"))?;
        let is_paused = contract.paused().await.map_err(read_failed("paused"))?;
        let allowlist_mint_enabled = contract
            .whitelist_mint_enabled()
            .await
            .map_err(read_failed("whitelistMintEnabled"))?;

        let caller = self.state.borrow().connected_address;
        let caller_allowlisted = caller.is_some_and(|address| self.config.allowlist.contains(&address));

        if max_supply > 0 && total_supply > max_supply {
            warn!(total_supply, max_supply, "total supply above max supply");
        }
        let snapshot = ContractSnapshot {
            total_supply: if max_supply > 0 {
                total_supply.min(max_supply)
            } else {
                total_supply
            },
            max_supply,
            max_mint_per_tx,
            unit_price,
            is_paused,
            allowlist_mint_enabled,
            caller_allowlisted,
        };
        debug!(?snapshot, "contract snapshot refreshed");
        self.update(|session| session.snapshot = snapshot);
        Ok(())
    }

    /// Submit a mint and follow it to confirmation.
    ///
    /// Returns the receipt on success. Failures land in the error slot and
    /// leave the snapshot as it was.
    pub async fn submit_mint(&self, quantity: u64, path: MintPath) -> Option<TxReceipt> {
        self.update(|session| session.last_error = None);
        match self.try_submit_mint(quantity, path).await {
            Ok(receipt) => Some(receipt),
            Err(err) => {
                self.set_error(&err);
                self.update(|session| session.loading = false);
                None
            }
        }
    }

    async fn try_submit_mint(&self, quantity: u64, path: MintPath) -> Result<TxReceipt, SessionError> {
        let contract = self.contract().ok_or(SessionError::NotReady)?;
        let (address, snapshot, network_config) = {
            let session = self.state.borrow();
            (
                session.connected_address,
                session.snapshot.clone(),
                session.network_config.clone(),
            )
        };
        let address = address.ok_or(SessionError::NotReady)?;

        let max = snapshot.max_mint_per_tx.max(1);
        if quantity == 0 || quantity > max {
            return Err(SessionError::InvalidQuantity { quantity, max });
        }
        let value = payment_for(snapshot.unit_price, quantity)?;

        let proof = match path {
            MintPath::Standard => None,
            MintPath::Allowlist => Some(
                self.config
                    .allowlist
                    .proof_for(&address)
                    .map_err(|_| SessionError::NotAllowlisted(address))?,
            ),
        };

        self.update(|session| session.loading = true);
        let submitted = match &proof {
            None => contract.mint(quantity, value).await,
            Some(proof) => contract.allowlist_mint(quantity, proof, value).await,
        };
        let pending = submitted.map_err(SessionError::from_submission)?;

        let hash = pending.hash();
        info!(%hash, quantity, ?path, "mint submitted");
        self.notifier.notify(Notification {
            kind: NotificationKind::Info,
            message: "Transaction sent! Please wait...".to_owned(),
            link: Some(explorer_link(&network_config, &hash)),
        });

        let receipt = pending.wait().await.map_err(SessionError::TransactionFailed)?;
        self.notifier.notify(Notification {
            kind: NotificationKind::Success,
            message: "Success!".to_owned(),
            link: Some(explorer_link(&network_config, &receipt.transaction_hash)),
        });

        self.refresh_contract_snapshot().await;
        self.update(|session| session.loading = false);
        Ok(receipt)
    }

    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                debug!(count = accounts.len(), "accounts changed");
                self.refresh_session().await;
            }
            ProviderEvent::ChainChanged(chain_id) => {
                info!(%chain_id, "chain changed, reloading");
                *self.contract.borrow_mut() = None;
                self.update(|session| session.contract_ready = false);
                let host = self.host.borrow().clone();
                if let Some(host) = host {
                    host.reload();
                }
            }
        }
    }

    /// Dispatch provider notifications until the provider stops sending.
    pub async fn pump_events(&self) {
        let Some(mut events) = self.events.borrow_mut().take() else {
            return;
        };
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        debug!("provider event stream closed");
    }

    pub fn dismiss_error(&self) {
        self.update(|session| session.last_error = None);
    }

    /// Manual allow-list proof tool.
    pub fn lookup_proof(&self, raw: &str) -> ProofFeedback {
        let raw = raw.trim();
        let feedback = match Address::from_str(raw) {
            Err(_) => ProofFeedback::InvalidAddress,
            Ok(address) => match self.config.allowlist.proof_for(&address) {
                Ok(proof) => ProofFeedback::from_proof(&proof),
                Err(_) => ProofFeedback::NotAllowlisted { address },
            },
        };

        let lookup = ProofLookup {
            address: raw.to_owned(),
            feedback: Some(feedback.clone()),
        };
        self.update(|session| session.manual_proof = lookup);
        feedback
    }
}

fn explorer_link(network: &NetworkConfig, hash: &TxHash) -> ExplorerLink {
    ExplorerLink {
        label: format!("View on {}", network.block_explorer.name),
        url: network.transaction_url(hash),
    }
}
