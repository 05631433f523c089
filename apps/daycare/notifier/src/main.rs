//! Daycare Notifier
//!
//! Sends daycare notification emails: new events to admins and parents, new
//! and paid invoices to the invoiced parent. Entity payloads are read from
//! JSON files as written by the application.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_notifications::mongo::{MongoDeliveryLog, MongoDirectory, MongoSettingsStore};
use domain_notifications::{EventRecord, InvoiceRecord, NotificationService};
use eyre::{Result, WrapErr, bail, eyre};
use serde::de::DeserializeOwned;
use tracing::info;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "daycare-notifier")]
#[command(about = "Send daycare event and invoice notifications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Notify every admin about a new event
    EventAdmins {
        /// Event JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Notify parents about a new event (scoped by the event's group)
    EventParents {
        /// Event JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Notify a parent about a new invoice
    InvoiceCreated {
        /// Invoice JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Parent uid. Defaults to the invoice's parentId.
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Notify a parent that their invoice was paid
    InvoicePaid {
        /// Invoice JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Parent uid. Defaults to the invoice's parentId.
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Show recent delivery records for an address
    History {
        /// Recipient email address
        #[arg(short, long)]
        email: String,

        /// Maximum records to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Check the configured email transport
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(database = %config.mongo.database, "Connecting to MongoDB...");
    let client = mongodb::Client::with_uri_str(&config.mongo.uri)
        .await
        .wrap_err("MongoDB connection failed")?;
    let db = client.database(&config.mongo.database);

    let provider = config.build_provider()?;
    let service = NotificationService::new(
        Arc::new(MongoDirectory::new(&db)),
        Arc::new(MongoSettingsStore::new(&db)),
        Arc::new(MongoDeliveryLog::new(&db)),
        provider,
        config.notifications.clone(),
    );

    match cli.command {
        Commands::EventAdmins { file } => {
            let event: EventRecord = read_payload(&file).await?;
            let report = service.notify_admins_new_event(&event).await?;
            println!("{report}");
        }

        Commands::EventParents { file } => {
            let event: EventRecord = read_payload(&file).await?;
            let report = service.notify_parents_new_event(&event).await?;
            println!("{report}");
        }

        Commands::InvoiceCreated { file, parent } => {
            let invoice: InvoiceRecord = read_payload(&file).await?;
            let parent = find_invoice_parent(&service, &invoice, parent).await?;
            let report = service.notify_parent_new_invoice(&invoice, &parent).await;
            println!("{report}");
        }

        Commands::InvoicePaid { file, parent } => {
            let invoice: InvoiceRecord = read_payload(&file).await?;
            let parent = find_invoice_parent(&service, &invoice, parent).await?;
            let report = service.notify_parent_invoice_paid(&invoice, &parent).await;
            println!("{report}");
        }

        Commands::History { email, limit } => {
            let records = service.delivery_history(&email, limit).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Commands::Health => {
            if !service.health_check().await? {
                bail!("{:?} transport is not ready", config.transport);
            }
            println!("{:?} transport healthy", config.transport);
        }
    }

    Ok(())
}

async fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("Invalid JSON in {}", path.display()))
}

async fn find_invoice_parent(
    service: &NotificationService,
    invoice: &InvoiceRecord,
    parent: Option<String>,
) -> Result<domain_notifications::UserRecord> {
    let parent_id = parent
        .or_else(|| invoice.parent_id.clone())
        .ok_or_else(|| eyre!("No parent given and the invoice has no parentId"))?;
    Ok(service.find_parent(&parent_id).await?)
}
