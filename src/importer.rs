use std::path::Path;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::columns::{ColumnMapping, ColumnResolver};
use crate::error::{Result, RowError, SeedError};
use crate::models::TransactionRecord;
use crate::settings::Settings;
use crate::transformer::RowContext;
use crate::writer::{write_batch, DocumentSink};

/// A row left out of the batch. `line` is where the record starts in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub error: RowError,
}

/// Rows parsed from one file, before anything is written.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub records: Vec<TransactionRecord>,
    pub rows_read: usize,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub skipped: Vec<SkippedRow>,
    pub attempted: usize,
    pub inserted: usize,
    /// Set when the bulk insert itself failed; covers the whole batch.
    pub write_error: Option<String>,
}

fn open_reader(file_path: &Path) -> Result<csv::Reader<std::io::BufReader<std::fs::File>>> {
    let file = std::fs::File::open(file_path)?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(std::io::BufReader::new(file)))
}

/// Read the header of `file_path` and map it onto the logical fields.
pub fn resolve_file_columns(file_path: &Path, resolver: &ColumnResolver) -> Result<(Vec<String>, ColumnMapping)> {
    let mut rdr = open_reader(file_path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mapping = resolver.resolve(headers.as_slice())?;
    Ok((headers, mapping))
}

/// Parse every row of `file_path` into a batch. Column problems are fatal;
/// anything wrong with a single row only skips that row.
pub fn build_batch<R: Rng + ?Sized>(
    file_path: &Path,
    settings: &Settings,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<ParsedBatch> {
    info!(file = %file_path.display(), "importing transactions");
    let resolver = ColumnResolver::with_aliases(&settings.column_aliases)?;
    let pool = settings.customer_pool()?;
    debug!(pool_size = pool.len(), policy = ?settings.customer_policy, "customer pool");

    let mut rdr = open_reader(file_path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mapping = resolver.resolve(headers.as_slice())?;
    for (field, col) in mapping.iter() {
        debug!(field = field.key(), column = %col.name, index = col.index, "resolved column");
    }

    let mut ctx = RowContext {
        mapping: &mapping,
        pool: &pool,
        policy: settings.customer_policy,
        rng,
        now,
    };

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut rows_read = 0usize;
    let mut record = csv::StringRecord::new();
    loop {
        // Header is line 1; only used when the reader reports no position.
        let fallback_line = rows_read as u64 + 2;
        let (line, outcome) = match rdr.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => (
                record.position().map_or(fallback_line, |p| p.line()),
                ctx.transform(&record),
            ),
            // An unreadable record (invalid UTF-8) is only this row's problem.
            Err(e) if !matches!(e.kind(), csv::ErrorKind::Io(_)) => (
                e.position().map_or(fallback_line, |p| p.line()),
                Err(RowError::Unreadable(e.to_string())),
            ),
            Err(e) => return Err(e.into()),
        };
        rows_read += 1;
        match outcome {
            Ok(rec) => records.push(rec),
            Err(error) => {
                warn!(line, %error, "skipping row");
                skipped.push(SkippedRow { line, error });
            }
        }
    }
    Ok(ParsedBatch {
        records,
        rows_read,
        skipped,
    })
}

/// Send a parsed batch to the configured collection. A failed bulk insert
/// lands in `write_error`; connection problems are returned as errors.
pub fn write_parsed<S: DocumentSink>(batch: ParsedBatch, settings: &Settings, sink: &mut S) -> Result<ImportSummary> {
    let ParsedBatch {
        records,
        rows_read,
        skipped,
    } = batch;
    let attempted = records.len();
    let (inserted, write_error) = match write_batch(sink, &settings.transactions_collection, &records) {
        Ok(inserted) => (inserted, None),
        Err(SeedError::Write { message, .. }) => (0, Some(message)),
        Err(e) => return Err(e),
    };
    Ok(ImportSummary {
        rows_read,
        skipped,
        attempted,
        inserted,
        write_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CustomerPolicy;
    use crate::writer::MemorySink;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const HEADER: &str =
        "TransactionID,CustomerID,CustomerDOB,CustGender,CustLocation,CustAccountBalance,TransactionDate,TransactionTime,TransactionAmount (INR)";

    fn write_csv(dir: &Path, rows: &[&str]) -> std::path::PathBuf {
        let path = dir.join("bank_transactions.csv");
        let mut content = format!("{HEADER}\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 12, 0, 0).unwrap()
    }

    fn import(path: &Path, settings: &Settings, sink: &mut MemorySink) -> Result<ImportSummary> {
        let mut rng = StdRng::seed_from_u64(1);
        let batch = build_batch(path, settings, &mut rng, now())?;
        write_parsed(batch, settings, sink)
    }

    #[test]
    fn test_import_single_known_customer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &[
            "T1,605c72ef1b3f4e084f8b4567,10/1/94,F,JAMSHEDPUR,1000.50,01/04/25,093000,250.00",
        ]);
        let mut sink = MemorySink::default();
        let summary = import(&path, &Settings::default(), &mut sink).unwrap();
        assert_eq!(summary.rows_read, 1);
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.inserted, 1);
        assert!(summary.skipped.is_empty());

        let (collection, doc) = &sink.written[0];
        assert_eq!(collection, "transactions");
        assert_eq!(doc.get_object_id("customer_ref").unwrap().to_hex(), "605c72ef1b3f4e084f8b4567");
        assert_eq!(doc.get_f64("amount").unwrap(), 250.0);
        assert_eq!(doc.get_str("kind").unwrap(), "deposit");
    }

    #[test]
    fn test_bad_time_is_skipped_without_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &[
            "T1,605c72ef1b3f4e084f8b4567,10/1/94,F,JAMSHEDPUR,1000.50,01/04/25,abc,250.00",
        ]);
        let mut sink = MemorySink::default();
        let summary = import(&path, &Settings::default(), &mut sink).unwrap();
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].line, 2);
        assert!(matches!(summary.skipped[0].error, RowError::InvalidTimestamp(_)));
        assert_eq!(sink.calls, 0);
    }

    #[test]
    fn test_build_batch_reports_skips_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &[
            "T1,605c72ef1b3f4e084f8b4567,10/1/94,F,JAMSHEDPUR,1000.50,01/04/25,abc,250.00",
            "T2,605c72ef1b3f4e084f8b4567,10/1/94,F,JAMSHEDPUR,1000.50,01/04/25,093060,250.00",
            "T3,605c72ef1b3f4e084f8b4567,10/1/94,F,JAMSHEDPUR,1000.50,01/04/25,093000,250.00",
        ]);
        let mut rng = StdRng::seed_from_u64(1);
        let batch = build_batch(&path, &Settings::default(), &mut rng, now()).unwrap();
        assert_eq!(batch.rows_read, 3);
        assert_eq!(batch.records.len(), 1);
        let lines: Vec<u64> = batch.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn test_bad_rows_do_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &[
            "T1,C5841053,10/1/94,F,JAMSHEDPUR,17819.05,2/8/16,143207,25",
            "T2,C2142763,4/4/57,M,JHAJJAR,2270.69,2/8/16,141858,oops",
            "T3,C4417068,26/11/96,F,MUMBAI,,2/8/16,142712,459",
            "T4,C5342380,14/9/73,F,MUMBAI,866503.21,2/8/16,142714,2060",
            "T5,C9031234,24/3/88,F,NAVI MUMBAI,6714.43,32/8/16,181156,1762.5",
            "T6,C1536588,8/10/72,F,ITANAGAR,53609.2,2/8/16,173940,-676",
        ]);
        let mut sink = MemorySink::default();
        let summary = import(&path, &Settings::default(), &mut sink).unwrap();
        assert_eq!(summary.rows_read, 6);
        assert_eq!(summary.inserted, 3);
        let lines: Vec<u64> = summary.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 4, 6]);
        assert_eq!(sink.calls, 1);

        let pool = Settings::default().customer_pool().unwrap();
        for (_, doc) in &sink.written {
            assert!(pool.contains(&doc.get_object_id("customer_ref").unwrap()));
        }
        assert_eq!(sink.written[2].1.get_str("kind").unwrap(), "withdrawal");
    }

    #[test]
    fn test_missing_column_aborts_before_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        std::fs::write(&path, "TransactionID,CustomerID,TransactionDate\nT1,C1,01/04/25\n").unwrap();
        let mut sink = MemorySink::default();
        let err = import(&path, &Settings::default(), &mut sink).unwrap_err();
        assert!(matches!(err, SeedError::MissingColumn { .. }));
        assert_eq!(sink.calls, 0);
    }

    #[test]
    fn test_write_failure_is_reported_for_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &[
            "T1,605c72ef1b3f4e084f8b4567,10/1/94,F,JAMSHEDPUR,1000.50,01/04/25,093000,250.00",
            "T2,605c72ef1b3f4e084f8b4568,10/1/94,F,JAMSHEDPUR,1000.50,01/04/25,093000,-20",
        ]);
        let mut sink = MemorySink {
            fail_with: Some("connection reset".to_string()),
            ..MemorySink::default()
        };
        let summary = import(&path, &Settings::default(), &mut sink).unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.write_error.as_deref(), Some("connection reset"));
        assert_eq!(sink.calls, 1);
    }

    #[test]
    fn test_reject_policy_and_custom_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &[
            "T1,605c72ef1b3f4e084f8b4569,10/1/94,F,JAMSHEDPUR,1000.50,01/04/25,093000,250.00",
            "T2,C2142763,4/4/57,M,JHAJJAR,2270.69,2/8/16,141858,27999",
        ]);
        let settings = Settings {
            customer_policy: CustomerPolicy::Reject,
            transactions_collection: "imported_transactions".to_string(),
            ..Settings::default()
        };
        let mut sink = MemorySink::default();
        let summary = import(&path, &settings, &mut sink).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped[0].error, RowError::UnknownCustomer("C2142763".to_string()));
        assert_eq!(sink.written[0].0, "imported_transactions");
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut bytes = format!("{HEADER}\n").into_bytes();
        bytes.extend_from_slice(b"T1,C1,10/1/94,F,M\xdcNCHEN,10,01/04/25,093000,5\n");
        bytes.extend_from_slice(b"T2,605c72ef1b3f4e084f8b4567,10/1/94,F,PUNE,10,01/04/25,093000,5\n");
        std::fs::write(&path, bytes).unwrap();
        let mut sink = MemorySink::default();
        let summary = import(&path, &Settings::default(), &mut sink).unwrap();
        assert_eq!(summary.rows_read, 2);
        assert_eq!(summary.inserted, 1);
        assert!(matches!(summary.skipped[0].error, RowError::Unreadable(_)));
        assert_eq!(summary.skipped[0].line, 2);
    }

    #[test]
    fn test_resolve_file_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &[]);
        let (headers, mapping) = resolve_file_columns(&path, &ColumnResolver::default()).unwrap();
        assert_eq!(headers.len(), 9);
        assert_eq!(mapping.iter().count(), 6);
    }
}
