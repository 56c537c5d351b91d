use async_trait::async_trait;
use mg_chain_client::WalletProvider;
use mg_chain_jsonrpc::RpcWalletProvider;
use mg_session::HostEnvironment;
use std::rc::Rc;

use crate::dom;
use crate::eip1193::Eip1193Transport;

/// The page itself: `window.ethereum` for detection, `location.reload()` to start over.
pub struct BrowserHost;

#[async_trait(?Send)]
impl HostEnvironment for BrowserHost {
    async fn detect_provider(&self) -> Option<Rc<dyn WalletProvider>> {
        let transport = Eip1193Transport::detect()?;
        Some(Rc::new(RpcWalletProvider::new(transport)))
    }

    fn reload(&self) {
        if dom::window().location().reload().is_err() {
            gloo_console::error!("page reload failed");
        }
    }
}
