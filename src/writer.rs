use serde::Serialize;
use tracing::{debug, info};

use crate::db::get_database;
use crate::error::{Result, SeedError};

/// Destination for one bulk insert.
pub trait DocumentSink {
    /// Insert `docs` into `collection`, returning how many the server
    /// acknowledged.
    fn insert_many<T>(&mut self, collection: &str, docs: &[T]) -> Result<usize>
    where
        T: Serialize + Send + Sync;
}

/// Writes to MongoDB. The connection lives only for the duration of one
/// `insert_many` call.
pub struct MongoSink {
    uri: String,
    database: String,
}

impl MongoSink {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
        }
    }
}

impl DocumentSink for MongoSink {
    fn insert_many<T>(&mut self, collection: &str, docs: &[T]) -> Result<usize>
    where
        T: Serialize + Send + Sync,
    {
        let db = get_database(&self.uri, &self.database)?;
        let result = db
            .collection::<T>(collection)
            .insert_many(docs)
            .run()
            .map_err(|e| SeedError::Write {
                attempted: docs.len(),
                message: e.to_string(),
            })?;
        Ok(result.inserted_ids.len())
    }
}

/// One bulk write, no retry. An empty batch never reaches the sink.
pub fn write_batch<S, T>(sink: &mut S, collection: &str, docs: &[T]) -> Result<usize>
where
    S: DocumentSink,
    T: Serialize + Send + Sync,
{
    if docs.is_empty() {
        info!(collection, "no records to insert");
        return Ok(0);
    }
    info!(collection, count = docs.len(), "inserting batch");
    match sink.insert_many(collection, docs) {
        Ok(inserted) => {
            info!(collection, inserted, "batch written");
            Ok(inserted)
        }
        Err(e) => {
            debug!(collection, error = %e, "batch failed");
            Err(e)
        }
    }
}

/// In-memory sink for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySink {
    pub calls: usize,
    pub fail_with: Option<String>,
    pub written: Vec<(String, bson::Document)>,
}

#[cfg(test)]
impl DocumentSink for MemorySink {
    fn insert_many<T>(&mut self, collection: &str, docs: &[T]) -> Result<usize>
    where
        T: Serialize + Send + Sync,
    {
        self.calls += 1;
        if let Some(message) = &self.fail_with {
            return Err(SeedError::Write {
                attempted: docs.len(),
                message: message.clone(),
            });
        }
        for doc in docs {
            let doc = bson::to_document(doc).map_err(|e| SeedError::Other(e.to_string()))?;
            self.written.push((collection.to_string(), doc));
        }
        Ok(docs.len())
    }
}
