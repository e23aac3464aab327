use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use journal_client::config::ClientConfig;
use journal_client::logging::init_logging;
use journal_client::server;
use journal_client::{
    Cluster, CreateEntryArgs, JournalClient, JournalError, RpcConnection, SolanaRpc, Wallet,
};
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::read_keypair_file;

#[derive(Parser)]
#[command(
    name = "journal",
    version,
    about = "Read and write journal entries on Solana",
    long_about = "Client for the journal program. Lists, creates, updates and deletes \
                  entries signed by a local wallet, and serves a small web front-end."
)]
struct Cli {
    /// JSON config file
    #[arg(short, long, env = "JOURNAL_CONFIG")]
    config: Option<PathBuf>,

    /// Cluster: localnet, devnet, testnet, mainnet or an RPC URL
    #[arg(long, env = "JOURNAL_CLUSTER")]
    cluster: Option<Cluster>,

    /// RPC URL override
    #[arg(short, long, env = "JOURNAL_RPC_URL")]
    url: Option<String>,

    /// Wallet keypair file
    #[arg(short, long, env = "JOURNAL_KEYPAIR")]
    keypair: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every entry
    #[command(alias = "ls")]
    List,

    /// Show the entry at an address
    Show {
        /// Entry account address
        address: Pubkey,
    },

    /// Show the wallet balance
    Balance,

    /// Create an entry
    Create {
        /// Entry title (at most 32 bytes, it seeds the entry address)
        title: String,
        /// Entry message (at most 1000 bytes)
        message: String,
    },

    /// Replace the message of an entry
    Update {
        title: String,
        message: String,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        title: String,
    },

    /// Serve the web front-end
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(cluster) = cli.cluster {
        config.cluster = cluster;
    }
    if let Some(url) = cli.url {
        config.rpc_url = Some(url);
    }
    if let Some(keypair) = cli.keypair {
        config.keypair_path = keypair;
    }
    config.validate()?;

    init_logging(&config.log)?;

    let client = Arc::new(build_client(&config)?);

    match cli.command {
        Commands::List => {
            let entries = client.list_entries().await?;
            if entries.is_empty() {
                println!("No entries found.");
            }
            for record in entries {
                println!("{}  {}", record.address, record.state.title);
                println!("    owner:   {}", record.state.owner);
                println!("    message: {}", record.state.message);
            }
        }

        Commands::Show { address } => {
            let entry = client.fetch_entry(&address).await?;
            println!("{}", entry.title);
            println!("    owner:   {}", entry.owner);
            println!("    message: {}", entry.message);
        }

        Commands::Balance => {
            let lamports = client.balance().await?;
            println!("{} SOL ({lamports} lamports)", lamports_to_sol(lamports));
        }

        Commands::Create { title, message } => {
            // The balance guard reads the cached balance
            client.balance().await?;
            let args = CreateEntryArgs::new(title, message, client.wallet_pubkey());
            let signature = client.create_entry(&args).await?;
            println!("Created: {signature}");
        }

        Commands::Update { title, message } => {
            let args = CreateEntryArgs::new(title, message, client.wallet_pubkey());
            let signature = client.update_entry(&args).await?;
            println!("Updated: {signature}");
        }

        Commands::Delete { title } => {
            let signature = client.delete_entry(&title).await?;
            println!("Deleted: {signature}");
        }

        Commands::Serve => {
            server::serve(config.server_addr(), client).await?;
        }
    }

    Ok(())
}

fn build_client(config: &ClientConfig) -> Result<JournalClient> {
    let keypair = read_keypair_file(&config.keypair_path).map_err(|err| {
        JournalError::Wallet(format!(
            "cannot read keypair {}: {err}",
            config.keypair_path.display()
        ))
    })?;
    let wallet: Arc<Wallet> = Arc::new(keypair);

    let connection: Arc<dyn RpcConnection> = Arc::new(SolanaRpc::new(
        config.rpc_endpoint(),
        config.commitment_config()?,
    ));

    Ok(JournalClient::new(config.cluster.clone(), connection, wallet))
}
