use anyhow::bail;

pub const USAGE: &str = "\
usage: mint-console <command>

commands:
  status [--json]    connect to the node and print the session
  connect            request account access, then print the session
  mint [quantity]    mint through the sale that is currently open (default 1)
  proof <address>    print the allow-list proof for an address
  watch              follow account and chain changes until interrupted

environment:
  MINT_CONFIG_PATH       collection config (default config/collection.json)
  MINT_RPC_URL           JSON-RPC endpoint (default http://localhost:8545)
  MINT_POLL_INTERVAL_MS  receipt and wallet poll interval (default 1000)
  RUST_LOG               log filter";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status { json: bool },
    Connect,
    Mint { quantity: u64 },
    Proof { address: String },
    Watch,
    Help,
}

impl Command {
    pub fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut args = args.into_iter();
        let command = match args.next().as_deref() {
            None | Some("status") => {
                let json = match args.next().as_deref() {
                    None => false,
                    Some("--json") => true,
                    Some(other) => bail!("unexpected argument '{other}'"),
                };
                Self::Status { json }
            }
            Some("connect") => Self::Connect,
            Some("mint") => {
                let quantity = match args.next() {
                    None => 1,
                    Some(raw) => raw
                        .parse::<u64>()
                        .map_err(|_| anyhow::anyhow!("invalid quantity '{raw}'"))?,
                };
                if quantity == 0 {
                    bail!("quantity must be at least 1");
                }
                Self::Mint { quantity }
            }
            Some("proof") => match args.next() {
                Some(address) => Self::Proof { address },
                None => bail!("proof needs an address\n\n{USAGE}"),
            },
            Some("watch") => Self::Watch,
            Some("help" | "-h" | "--help") => Self::Help,
            Some(other) => bail!("unknown command '{other}'\n\n{USAGE}"),
        };

        if let Some(extra) = args.next() {
            bail!("unexpected argument '{extra}'");
        }
        Ok(command)
    }
}
