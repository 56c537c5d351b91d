mod command;
mod host;
mod render;

use anyhow::Context;
use mg_allowlist::Allowlist;
use mg_chain_jsonrpc::{HttpTransport, RpcWalletProvider};
use mg_network_config::CollectionConfig;
use mg_session::{ChannelNotifier, MintWidget, SessionConfig, SessionController};
use std::rc::Rc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use crate::command::Command;
use crate::host::ConsoleHost;

const DEFAULT_CONFIG_PATH: &str = "config/collection.json";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let command = Command::parse(std::env::args().skip(1))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run(command))
}

async fn run(command: Command) -> anyhow::Result<()> {
    if command == Command::Help {
        println!("{}", command::USAGE);
        return Ok(());
    }

    let config_path =
        std::env::var("MINT_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let collection = CollectionConfig::load(&config_path)?;
    let session_config = SessionConfig {
        networks: collection.network_table()?,
        allowlist: Allowlist::new(&collection.allowlist)?,
        // Development nodes never identify as MetaMask.
        accept_any_provider: true,
    };
    info!(
        "{} ({}) loaded from {}",
        collection.token_name, collection.contract_name, config_path
    );

    let (notify_tx, mut notifications) = mpsc::unbounded_channel();
    let controller = SessionController::new(session_config, Rc::new(ChannelNotifier::new(notify_tx)));

    if let Command::Proof { address } = &command {
        let feedback = controller.lookup_proof(address);
        println!("{}", feedback.message());
        return Ok(());
    }

    let transport = HttpTransport::default();
    info!("using JSON-RPC endpoint {}", transport.endpoint());
    let (reload_tx, mut reloads) = mpsc::unbounded_channel();
    let host = Rc::new(ConsoleHost::new(
        Rc::new(RpcWalletProvider::new(transport)),
        reload_tx,
    ));
    controller.initialize(host).await;

    match command {
        Command::Status { json } => print_session(&controller, &collection.token_name, json)?,
        Command::Connect => {
            controller.connect_wallet().await;
            print_session(&controller, &collection.token_name, false)?;
        }
        Command::Mint { quantity } => {
            mint(&controller, quantity, &mut notifications).await?;
        }
        Command::Watch => {
            watch(&controller, &collection.token_name, &mut notifications, &mut reloads).await?;
        }
        Command::Proof { .. } | Command::Help => {}
    }

    Ok(())
}

fn print_session(controller: &SessionController, token_name: &str, json: bool) -> anyhow::Result<()> {
    let session = controller.state();
    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        print!("{}", render::session(&session, token_name));
    }
    Ok(())
}

async fn mint(
    controller: &SessionController,
    quantity: u64,
    notifications: &mut UnboundedReceiver<mg_api_types::Notification>,
) -> anyhow::Result<()> {
    let session = controller.state();
    if let Some(error) = &session.last_error {
        anyhow::bail!(error.plain_text());
    }
    let props = session
        .mint_widget_props()
        .context("minting is not available (wallet not connected, wrong network or sold out)")?;

    let mut widget = MintWidget::new(props);
    while widget.quantity() < quantity {
        let before = widget.quantity();
        widget.increment();
        if widget.quantity() == before {
            anyhow::bail!(
                "quantity {} is above the per-transaction limit of {}",
                quantity,
                widget.props().max_mint_per_tx
            );
        }
    }
    if let Some(reason) = widget.cannot_mint_reason() {
        anyhow::bail!(render::cannot_mint(reason));
    }
    print!("{}", render::widget(&widget));

    let receipt = tokio::select! {
        receipt = widget.mint(controller) => receipt,
        _ = async {
            while let Some(notification) = notifications.recv().await {
                println!("{}", render::notification(&notification));
            }
        } => None,
    };
    while let Ok(notification) = notifications.try_recv() {
        println!("{}", render::notification(&notification));
    }

    match receipt {
        Some(receipt) => {
            info!("mint confirmed in block {:?}", receipt.block_number);
            Ok(())
        }
        None => {
            let message = controller
                .state()
                .last_error
                .map(|error| error.plain_text())
                .unwrap_or_else(|| "mint failed".to_string());
            anyhow::bail!(message)
        }
    }
}

async fn watch(
    controller: &SessionController,
    token_name: &str,
    notifications: &mut UnboundedReceiver<mg_api_types::Notification>,
    reloads: &mut UnboundedReceiver<()>,
) -> anyhow::Result<()> {
    let mut changes = controller.on_state_change();
    print!("{}", render::session(&changes.borrow_and_update(), token_name));

    let render_loop = async {
        while changes.changed().await.is_ok() {
            let session = changes.borrow_and_update().clone();
            print!("{}", render::session(&session, token_name));
        }
    };
    let notification_loop = async {
        while let Some(notification) = notifications.recv().await {
            println!("{}", render::notification(&notification));
        }
    };
    // A console cannot reload itself; re-deriving the session is the closest.
    let reload_loop = async {
        while reloads.recv().await.is_some() {
            controller.refresh_session().await;
        }
    };

    tokio::select! {
        _ = controller.pump_events() => {}
        _ = render_loop => {}
        _ = notification_loop => {}
        _ = reload_loop => {}
        result = tokio::signal::ctrl_c() => result?,
    }
    Ok(())
}
