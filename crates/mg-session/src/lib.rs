//! Dapp session: wallet connection, network validation, contract snapshot
//! and mint submission, plus the view state of the mint widget.

pub mod controller;
pub mod error;
pub mod host;
pub mod session;
pub mod widget;

#[cfg(test)]
mod testing;

pub use controller::{SessionConfig, SessionController, payment_for};
pub use error::{ErrorInfo, RichError, SessionError, normalize_message};
pub use host::{ChannelNotifier, HostEnvironment, Notifier};
pub use session::{ProofFeedback, ProofLookup, Session};
pub use widget::{CannotMintReason, MintWidget, MintWidgetProps, SaleStatus};
