//! In-memory wallet, contract and host doubles for driving the controller.

use async_trait::async_trait;
use mg_api_types::{
    Address, AllowlistProof, Bytes, ChainId, Network, Notification, TxHash, TxReceipt, U256,
};
use mg_chain_client::{
    ClientError, MintContract, PendingTransaction, ProviderError, ProviderEvent, WalletProvider,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Notify, watch};

use crate::host::{HostEnvironment, Notifier};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct FakeContractState {
    pub max_supply: u64,
    pub total_supply: u64,
    pub max_mint_per_tx: u64,
    pub cost: U256,
    pub paused: bool,
    pub whitelist_mint_enabled: bool,
    /// Accessor name (`"totalSupply"`, ...) whose read fails.
    pub failing_read: Option<&'static str>,
    pub submit_error: Option<ClientError>,
    pub wait_error: Option<ClientError>,
}

impl Default for FakeContractState {
    fn default() -> Self {
        Self {
            max_supply: 10_000,
            total_supply: 100,
            max_mint_per_tx: 5,
            cost: U256::from(10_000_000_000_000_000_u64),
            paused: false,
            whitelist_mint_enabled: false,
            failing_read: None,
            submit_error: None,
            wait_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMint {
    pub quantity: u64,
    pub value: U256,
    pub proof: Option<AllowlistProof>,
}

pub struct FakeContract {
    address: Address,
    state: Rc<RefCell<FakeContractState>>,
    mints: RefCell<Vec<RecordedMint>>,
}

impl FakeContract {
    pub fn new(address: Address, state: FakeContractState) -> Self {
        Self {
            address,
            state: Rc::new(RefCell::new(state)),
            mints: RefCell::new(Vec::new()),
        }
    }

    pub fn configure(&self, change: impl FnOnce(&mut FakeContractState)) {
        change(&mut self.state.borrow_mut());
    }

    pub fn total_supply_now(&self) -> u64 {
        self.state.borrow().total_supply
    }

    pub fn mints(&self) -> Vec<RecordedMint> {
        self.mints.borrow().clone()
    }

    fn read<T>(&self, accessor: &str, value: impl FnOnce(&FakeContractState) -> T) -> Result<T, ClientError> {
        let state = self.state.borrow();
        if state.failing_read == Some(accessor) {
            return Err(ClientError::Provider(ProviderError::new(
                Some(-32000),
                "header not found",
            )));
        }
        Ok(value(&state))
    }

    fn submit(
        &self,
        quantity: u64,
        value: U256,
        proof: Option<AllowlistProof>,
    ) -> Result<Box<dyn PendingTransaction>, ClientError> {
        self.mints.borrow_mut().push(RecordedMint {
            quantity,
            value,
            proof,
        });
        if let Some(err) = self.state.borrow().submit_error.clone() {
            return Err(err);
        }
        let nonce = self.mints.borrow().len() as u8;
        Ok(Box::new(FakePending {
            hash: TxHash::with_last_byte(nonce),
            quantity,
            state: Rc::clone(&self.state),
        }))
    }
}

#[async_trait(?Send)]
impl MintContract for FakeContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn max_supply(&self) -> Result<u64, ClientError> {
        self.read("maxSupply", |state| state.max_supply)
    }

    async fn total_supply(&self) -> Result<u64, ClientError> {
        self.read("totalSupply", |state| state.total_supply)
    }

    async fn max_mint_amount_per_tx(&self) -> Result<u64, ClientError> {
        self.read("maxMintAmountPerTx", |state| state.max_mint_per_tx)
    }

    async fn cost(&self) -> Result<U256, ClientError> {
        self.read("cost", |state| state.cost)
    }

    async fn paused(&self) -> Result<bool, ClientError> {
        self.read("paused", |state| state.paused)
    }

    async fn whitelist_mint_enabled(&self) -> Result<bool, ClientError> {
        self.read("whitelistMintEnabled", |state| state.whitelist_mint_enabled)
    }

    async fn mint(
        &self,
        quantity: u64,
        value: U256,
    ) -> Result<Box<dyn PendingTransaction>, ClientError> {
        self.submit(quantity, value, None)
    }

    async fn allowlist_mint(
        &self,
        quantity: u64,
        proof: &AllowlistProof,
        value: U256,
    ) -> Result<Box<dyn PendingTransaction>, ClientError> {
        self.submit(quantity, value, Some(proof.clone()))
    }
}

struct FakePending {
    hash: TxHash,
    quantity: u64,
    state: Rc<RefCell<FakeContractState>>,
}

#[async_trait(?Send)]
impl PendingTransaction for FakePending {
    fn hash(&self) -> TxHash {
        self.hash
    }

    async fn wait(self: Box<Self>) -> Result<TxReceipt, ClientError> {
        let mut state = self.state.borrow_mut();
        if let Some(err) = state.wait_error.clone() {
            return Err(err);
        }
        state.total_supply += self.quantity;
        Ok(TxReceipt {
            transaction_hash: self.hash,
            block_number: Some(1),
            success: true,
        })
    }
}

pub struct FakeProvider {
    metamask: bool,
    accounts: RefCell<Vec<Address>>,
    chain_id: Cell<ChainId>,
    code: RefCell<Bytes>,
    request_error: RefCell<Option<ClientError>>,
    request_gate: RefCell<Option<Rc<Notify>>>,
    request_calls: Cell<usize>,
    events_tx: UnboundedSender<ProviderEvent>,
    events_rx: RefCell<Option<UnboundedReceiver<ProviderEvent>>>,
    contract: Rc<FakeContract>,
}

impl FakeProvider {
    /// A MetaMask-like wallet on `chain_id` with the contract deployed.
    pub fn new(chain_id: ChainId, contract: Rc<FakeContract>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            metamask: true,
            accounts: RefCell::new(Vec::new()),
            chain_id: Cell::new(chain_id),
            code: RefCell::new(Bytes::from_static(&[0x60, 0x80, 0x60, 0x40])),
            request_error: RefCell::new(None),
            request_gate: RefCell::new(None),
            request_calls: Cell::new(0),
            events_tx,
            events_rx: RefCell::new(Some(events_rx)),
            contract,
        }
    }

    pub fn not_metamask(mut self) -> Self {
        self.metamask = false;
        self
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.borrow_mut() = accounts;
    }

    pub fn set_chain(&self, chain_id: ChainId) {
        self.chain_id.set(chain_id);
    }

    pub fn set_code(&self, code: Bytes) {
        *self.code.borrow_mut() = code;
    }

    pub fn fail_requests(&self, err: ClientError) {
        *self.request_error.borrow_mut() = Some(err);
    }

    /// Hold `request_accounts` until the returned handle is notified.
    pub fn gate_requests(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.request_gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn request_calls(&self) -> usize {
        self.request_calls.get()
    }

    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn contract_double(&self) -> Rc<FakeContract> {
        Rc::clone(&self.contract)
    }
}

#[async_trait(?Send)]
impl WalletProvider for FakeProvider {
    fn is_metamask(&self) -> bool {
        self.metamask
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        self.request_calls.set(self.request_calls.get() + 1);
        let gate = self.request_gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.request_error.borrow().clone() {
            return Err(err);
        }
        Ok(self.accounts.borrow().clone())
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, ClientError> {
        Ok(self.accounts.borrow().clone())
    }

    async fn get_network(&self) -> Result<Network, ClientError> {
        Ok(Network::from_chain_id(self.chain_id.get()))
    }

    async fn get_code(&self, _address: Address) -> Result<Bytes, ClientError> {
        Ok(self.code.borrow().clone())
    }

    fn subscribe(&self) -> Option<UnboundedReceiver<ProviderEvent>> {
        self.events_rx.borrow_mut().take()
    }

    fn contract(&self, _address: Address, _signer: Address) -> Rc<dyn MintContract> {
        self.contract.clone()
    }
}

pub struct FakeHost {
    provider: Option<Rc<dyn WalletProvider>>,
    reloads: Cell<usize>,
}

impl FakeHost {
    pub fn new(provider: Option<Rc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            reloads: Cell::new(0),
        }
    }

    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }
}

#[async_trait(?Send)]
impl HostEnvironment for FakeHost {
    async fn detect_provider(&self) -> Option<Rc<dyn WalletProvider>> {
        self.provider.clone()
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
}

/// Keeps every notification together with the session as it was at that moment.
#[derive(Default)]
pub struct RecordingNotifier {
    state: RefCell<Option<watch::Receiver<Session>>>,
    seen: RefCell<Vec<(Notification, Option<Session>)>>,
}

impl RecordingNotifier {
    pub fn attach(&self, state: watch::Receiver<Session>) {
        *self.state.borrow_mut() = Some(state);
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn sessions(&self) -> Vec<Option<Session>> {
        self.seen.borrow().iter().map(|(_, s)| s.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        let session = self
            .state
            .borrow()
            .as_ref()
            .map(|state| state.borrow().clone());
        self.seen.borrow_mut().push((notification, session));
    }
}
