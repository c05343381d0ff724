use std::path::Path;

use chrono::Utc;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::seed::{seed, SeedSet};
use crate::writer::MongoSink;

use super::settings_with_uri;

pub fn run(set: SeedSet, config: Option<&Path>, uri: Option<String>) -> Result<()> {
    let settings = settings_with_uri(config, uri)?;
    let mut sink = MongoSink::new(&settings.mongodb_uri, &settings.database);
    let results = seed(set, &mut sink, Utc::now())?;

    let mut table = Table::new();
    table.set_header(vec!["Collection", "Inserted"]);
    for (collection, inserted) in results {
        table.add_row(vec![Cell::new(collection), Cell::new(inserted)]);
    }
    println!("{table}");
    Ok(())
}
