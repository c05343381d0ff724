use std::path::Path;

use chrono::Utc;
use colored::Colorize;

use crate::db::redact_uri;
use crate::error::{Result, SeedError};
use crate::importer::{build_batch, write_parsed};
use crate::settings::CustomerPolicy;
use crate::writer::MongoSink;

use super::settings_with_uri;

pub fn run(
    file: &Path,
    config: Option<&Path>,
    uri: Option<String>,
    collection: Option<String>,
    policy: Option<CustomerPolicy>,
) -> Result<()> {
    let mut settings = settings_with_uri(config, uri)?;
    if let Some(collection) = collection {
        settings.transactions_collection = collection;
    }
    if let Some(policy) = policy {
        settings.customer_policy = policy;
    }

    tracing::info!(uri = %redact_uri(&settings.mongodb_uri), "target database");
    let mut sink = MongoSink::new(&settings.mongodb_uri, &settings.database);
    let batch = build_batch(file, &settings, &mut rand::thread_rng(), Utc::now())?;
    // Printed before connecting.
    for skip in &batch.skipped {
        println!("{}", format!("Skipped line {}: {}", skip.line, skip.error).yellow());
    }
    let summary = write_parsed(batch, &settings, &mut sink)?;

    let inserted = format!("{} inserted", summary.inserted);
    println!(
        "{} rows read, {} skipped, {} attempted, {} into {}",
        summary.rows_read,
        summary.skipped.len(),
        summary.attempted,
        if summary.inserted > 0 { inserted.green() } else { inserted.normal() },
        settings.transactions_collection
    );

    if let Some(message) = summary.write_error {
        return Err(SeedError::Write {
            attempted: summary.attempted,
            message,
        });
    }
    Ok(())
}
