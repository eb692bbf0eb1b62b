use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use storefront_payments::application::ledger::PurchaseLedger;
use storefront_payments::application::orchestrator::PaymentOrchestrator;
use storefront_payments::config::AppConfig;
use storefront_payments::domain::intent::WebhookEvent;
use storefront_payments::domain::ports::PurchaseStoreBox;
use storefront_payments::domain::template::TemplateRecord;
use storefront_payments::gateways::registry::ProviderRegistry;
use storefront_payments::infrastructure::in_memory::{InMemoryCatalog, InMemoryPurchaseStore};
use storefront_payments::interfaces::jsonl::event_reader::{Event, EventReader};
use storefront_payments::interfaces::jsonl::purchase_writer::PurchaseWriter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payment events file (JSON lines: intent, webhook, refund)
    input: PathBuf,

    /// Template catalog file (JSON array of records with id, name, base_price_clp)
    #[arg(long)]
    catalog: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let catalog_file = File::open(&cli.catalog).into_diagnostic()?;
    let records: Vec<TemplateRecord> =
        serde_json::from_reader(BufReader::new(catalog_file)).into_diagnostic()?;
    let catalog = InMemoryCatalog::with_records(records);

    let store: PurchaseStoreBox = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => Box::new(
            storefront_payments::infrastructure::rocksdb::RocksDbPurchaseStore::open(db_path)
                .into_diagnostic()?,
        ),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => miette::bail!("this binary was built without the storage-rocksdb feature"),
        None => Box::new(InMemoryPurchaseStore::new()),
    };

    let ledger = PurchaseLedger::new(store, Box::new(catalog));
    let registry = ProviderRegistry::from_config(&config);
    let orchestrator =
        PaymentOrchestrator::new(registry, ledger).with_gateway_timeout(config.gateway_timeout);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = EventReader::new(BufReader::new(file));
    for event_result in reader.events() {
        match event_result {
            Ok(event) => {
                if let Err(e) = process_event(&orchestrator, event).await {
                    eprintln!("Error processing event: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    let purchases = orchestrator.into_results().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = PurchaseWriter::new(stdout.lock());
    writer.write_purchases(purchases).into_diagnostic()?;

    Ok(())
}

async fn process_event(
    orchestrator: &PaymentOrchestrator,
    event: Event,
) -> storefront_payments::error::Result<()> {
    match event {
        Event::Intent(intent) => {
            orchestrator.create_payment_intent(intent).await?;
        }
        Event::Webhook {
            provider,
            body,
            headers,
        } => {
            orchestrator
                .handle_webhook(&provider, WebhookEvent { body, headers })
                .await?;
        }
        Event::Refund {
            provider,
            payment_id,
            opts,
        } => {
            orchestrator
                .refund_payment(&provider, &payment_id, opts)
                .await?;
        }
    }
    Ok(())
}
