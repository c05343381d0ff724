use std::path::Path;

use comfy_table::{Cell, Table};

use crate::columns::ColumnResolver;
use crate::error::Result;
use crate::importer::resolve_file_columns;
use crate::settings::load_settings;

pub fn run(file: &Path, config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let resolver = ColumnResolver::with_aliases(&settings.column_aliases)?;
    let (headers, mapping) = resolve_file_columns(file, &resolver)?;

    println!("Columns in {}: {}", file.display(), headers.join(", "));

    let mut table = Table::new();
    table.set_header(vec!["Field", "Column", "Index"]);
    for (field, col) in mapping.iter() {
        table.add_row(vec![
            Cell::new(field.key()),
            Cell::new(&col.name),
            Cell::new(col.index),
        ]);
    }
    println!("{table}");
    Ok(())
}
