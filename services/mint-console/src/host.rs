use async_trait::async_trait;
use mg_chain_client::WalletProvider;
use mg_session::HostEnvironment;
use std::rc::Rc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// The node behind `MINT_RPC_URL` is always "detected"; reload requests are
/// forwarded to whoever is running the event loop.
pub struct ConsoleHost {
    provider: Rc<dyn WalletProvider>,
    reloads: UnboundedSender<()>,
}

impl ConsoleHost {
    pub fn new(provider: Rc<dyn WalletProvider>, reloads: UnboundedSender<()>) -> Self {
        Self { provider, reloads }
    }
}

#[async_trait(?Send)]
impl HostEnvironment for ConsoleHost {
    async fn detect_provider(&self) -> Option<Rc<dyn WalletProvider>> {
        Some(Rc::clone(&self.provider))
    }

    fn reload(&self) {
        info!("chain changed, reloading session");
        let _ = self.reloads.send(());
    }
}
