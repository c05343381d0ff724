use std::path::Path;

use crate::db::redact_uri;
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(config: Option<&Path>, uri: Option<String>, database: Option<String>) -> Result<()> {
    let mut settings = load_settings(config)?;
    if let Some(uri) = uri {
        settings.mongodb_uri = uri;
    }
    if let Some(database) = database {
        settings.database = database;
    }
    let path = save_settings(&settings, config)?;

    println!("Wrote {}", path.display());
    println!("  MongoDB:   {}", redact_uri(&settings.mongodb_uri));
    println!("  Database:  {}", settings.database);
    println!("  Pool:      {} customer ids", settings.customer_pool.len());
    Ok(())
}
