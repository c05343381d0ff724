use std::collections::BTreeMap;

use crate::error::{Result, SeedError};

/// Canonical fields a transaction export must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicalField {
    TransactionId,
    CustomerId,
    Balance,
    Date,
    Time,
    Amount,
}

impl LogicalField {
    pub const ALL: [LogicalField; 6] = [
        Self::TransactionId,
        Self::CustomerId,
        Self::Balance,
        Self::Date,
        Self::Time,
        Self::Amount,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::TransactionId => "transaction_id",
            Self::CustomerId => "customer_id",
            Self::Balance => "balance",
            Self::Date => "date",
            Self::Time => "time",
            Self::Amount => "amount",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().find(|f| f.key() == key).copied()
    }

    /// Lowercase substrings that identify this field in a source header.
    pub fn default_fragments(&self) -> &'static [&'static str] {
        match self {
            Self::TransactionId => &["transactionid", "transaction_id"],
            Self::CustomerId => &["customerid", "customer_id"],
            Self::Balance => &["custaccountbalance", "account_balance", "balance"],
            Self::Date => &["transactiondate", "transaction_date"],
            Self::Time => &["transactiontime", "transaction_time"],
            Self::Amount => &["transactionamount", "transaction_amount", "amount"],
        }
    }
}

/// Where one logical field lives in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<LogicalField, ResolvedColumn>,
}

impl ColumnMapping {
    pub fn get(&self, field: LogicalField) -> Option<&ResolvedColumn> {
        self.columns.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalField, &ResolvedColumn)> {
        self.columns.iter().map(|(f, c)| (*f, c))
    }
}

pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct ColumnResolver {
    fragments: BTreeMap<LogicalField, Vec<String>>,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        let fragments = LogicalField::ALL
            .iter()
            .map(|f| (*f, f.default_fragments().iter().map(|s| s.to_string()).collect()))
            .collect();
        Self { fragments }
    }
}

impl ColumnResolver {
    /// Default fragments plus configured aliases keyed by field name.
    pub fn with_aliases(aliases: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut resolver = Self::default();
        for (key, extra) in aliases {
            let field = LogicalField::from_key(key).ok_or_else(|| {
                SeedError::Settings(format!("column_aliases: unknown field {key:?}"))
            })?;
            let entry = resolver.fragments.entry(field).or_default();
            entry.extend(extra.iter().map(|s| normalize(s)).filter(|s| !s.is_empty()));
        }
        Ok(resolver)
    }

    pub fn fragments(&self, field: LogicalField) -> &[String] {
        self.fragments.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Map every logical field onto a source column. For each field the
    /// first header (in file order) containing one of its fragments wins.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<ColumnMapping> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize(h.as_ref())).collect();
        let mut columns = BTreeMap::new();
        for field in LogicalField::ALL {
            let fragments = self.fragments(field);
            let found = normalized
                .iter()
                .position(|col| fragments.iter().any(|frag| col.contains(frag.as_str())));
            let Some(index) = found else {
                return Err(SeedError::MissingColumn {
                    field: field.key().to_string(),
                    fragments: fragments.join(", "),
                });
            };
            columns.insert(
                field,
                ResolvedColumn {
                    index,
                    name: headers[index].as_ref().to_string(),
                },
            );
        }
        Ok(ColumnMapping { columns })
    }
}
