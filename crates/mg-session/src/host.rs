//! Seams between the controller and whatever hosts it (browser page, console).

use async_trait::async_trait;
use mg_api_types::Notification;
use mg_chain_client::WalletProvider;
use std::rc::Rc;
use tokio::sync::mpsc::UnboundedSender;

#[async_trait(?Send)]
pub trait HostEnvironment {
    /// Look for an injected wallet provider. `None` when there is none.
    async fn detect_provider(&self) -> Option<Rc<dyn WalletProvider>>;

    /// Throw away the application context and start over.
    fn reload(&self);
}

/// Ephemeral, dismissible user notifications (toasts).
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

pub struct ChannelNotifier {
    tx: UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new(tx: UnboundedSender<Notification>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Nobody listening means nobody to show it to.
        let _ = self.tx.send(notification);
    }
}
