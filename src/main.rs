//! Web3Mail bulk dispatch CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   private key ──▶ session::create_wallet
//!                        │
//!                        ▼
//!   contacts ───▶ session::load_contacts ──▶ web3mail::guard ──▶ chain RPC (alloy)
//!                        │                        │
//!                        │                        ▼
//!                        │                 web3mail::gateway ──▶ mail gateway (HTTP)
//!                        ▼                        ▲
//!   send-all ───▶ session::send_to_all ───────────┘
//!                  (one contact at a time, "Sending i of n..." on stderr)
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use web3mail_dispatch::config::load_or_default;
use web3mail_dispatch::lifecycle::{signals, CancelToken};
use web3mail_dispatch::observability::{logging, metrics};
use web3mail_dispatch::session::{LiveSession, Page};
use web3mail_dispatch::web3mail::{Contact, MessageDraft};

#[derive(Parser)]
#[command(name = "web3mail-dispatch")]
#[command(about = "Send Web3Mail messages to the contacts that authorized your wallet", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wallet private key (hex, with or without 0x)
    #[arg(long, env = "WEB3MAIL_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Log level, overrides the configuration file
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct MessageArgs {
    #[arg(long, default_value = "")]
    subject: String,

    #[arg(long, default_value = "")]
    body: String,

    /// Sender name shown to recipients
    #[arg(long, default_value = "")]
    sender: String,
}

impl MessageArgs {
    fn into_draft(self) -> MessageDraft {
        MessageDraft {
            subject: self.subject,
            body: self.body,
            sender_name: self.sender,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the wallet address
    Address,
    /// List the contacts that authorized this wallet
    Contacts {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Send one message
    Send {
        /// Recipient (protected data address)
        #[arg(long)]
        to: String,
        #[command(flatten)]
        message: MessageArgs,
    },
    /// Send one message to every contact, one at a time
    SendAll {
        #[command(flatten)]
        message: MessageArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(config.observability.log_level.as_str());
    logging::init(level);

    tracing::info!("web3mail-dispatch v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let session = LiveSession::from_config(&config)?;
    let address = session.create_wallet(cli.private_key.as_deref().unwrap_or_default())?;

    match cli.command {
        Commands::Address => {
            println!("{}", address);
        }
        Commands::Contacts { page } => {
            session.load_contacts().await?;
            print_contacts(&session.contact_page(page));
        }
        Commands::Send { to, message } => {
            session.set_draft(message.into_draft());
            let task_id = session.send_message(&to).await?;
            println!("{}", task_id);
            eprintln!("The email is being sent.");
        }
        Commands::SendAll { message } => {
            session.set_draft(message.into_draft());
            session.load_contacts().await?;

            let cancel = CancelToken::new();
            let ctrl_c = signals::cancel_on_ctrl_c(cancel.clone());
            let printer = print_progress(session.subscribe_progress());

            let result = session.send_to_all(Some(&cancel)).await;
            printer.abort();
            ctrl_c.abort();

            let report = result?;
            for delivery in &report.deliveries {
                println!("{}\t{}", delivery.recipient, delivery.task_id);
            }
            eprintln!("The email is being sent.");
        }
    }

    Ok(())
}

/// Echo every non-empty progress label to stderr.
fn print_progress(mut progress: watch::Receiver<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let label = progress.borrow_and_update().clone();
            if !label.is_empty() {
                eprintln!("{}", label);
            }
        }
    })
}

fn print_contacts(page: &Page<Contact>) {
    println!("Contact Number : {}", page.total_items);
    for contact in &page.items {
        println!("{}", contact.address);
    }

    if !page.numbers.is_empty() {
        let prev = if page.has_prev { "<" } else { " " };
        let next = if page.has_next { ">" } else { " " };
        let numbers: Vec<String> = page.numbers.iter().map(|n| n.to_string()).collect();
        println!("{} {} {}  (page {} of {})", prev, numbers.join(" "), next, page.current, page.total_pages);
    }
}
