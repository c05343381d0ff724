use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use rand::Rng;
use rust_decimal::Decimal;

use crate::columns::{ColumnMapping, LogicalField};
use crate::error::RowError;
use crate::models::{CustomerPool, TransactionKind, TransactionRecord};
use crate::settings::CustomerPolicy;

pub const TIMESTAMP_FORMAT: &str = "%d/%m/%y %H%M%S";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Values that would need rounding to fit a `Decimal` are rejected, whether
/// written out in full or in scientific notation.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, RowError> {
    let s = raw.trim().replace(',', "");
    Decimal::from_str_exact(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .map_err(|_| RowError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

/// Join a `dd/mm/yy` date with an `HHMMSS` time. Times lose their leading
/// zeros in some exports, so the time is left-padded to six digits first.
pub fn parse_timestamp(date: &str, time: &str) -> Result<DateTime<Utc>, RowError> {
    let combined = format!("{} {:0>6}", date.trim(), time.trim());
    match NaiveDateTime::parse_from_str(&combined, TIMESTAMP_FORMAT) {
        // chrono reads second 60 as a leap second; the exports never mean that.
        Ok(naive) if naive.nanosecond() < 1_000_000_000 => Ok(naive.and_utc()),
        _ => Err(RowError::InvalidTimestamp(combined)),
    }
}

/// Everything a row needs besides the row itself.
pub struct RowContext<'a, R: Rng + ?Sized> {
    pub mapping: &'a ColumnMapping,
    pub pool: &'a CustomerPool,
    pub policy: CustomerPolicy,
    pub rng: &'a mut R,
    pub now: DateTime<Utc>,
}

impl<R: Rng + ?Sized> RowContext<'_, R> {
    fn value<'r>(&self, row: &'r csv::StringRecord, field: LogicalField) -> Result<&'r str, RowError> {
        self.mapping
            .get(field)
            .and_then(|col| row.get(col.index))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(RowError::MissingValue(field.key()))
    }

    fn resolve_customer(&mut self, raw: &str) -> Result<ObjectId, RowError> {
        if let Some(id) = ObjectId::parse_str(raw).ok().filter(|id| self.pool.contains(id)) {
            return Ok(id);
        }
        match self.policy {
            CustomerPolicy::Random => self
                .pool
                .choose(&mut *self.rng)
                .ok_or_else(|| RowError::UnknownCustomer(raw.to_string())),
            CustomerPolicy::Reject => Err(RowError::UnknownCustomer(raw.to_string())),
        }
    }

    /// Turn one source row into a record, or say why it can't be.
    pub fn transform(&mut self, row: &csv::StringRecord) -> Result<TransactionRecord, RowError> {
        let transaction_id = self.value(row, LogicalField::TransactionId)?.to_string();
        let customer_raw = self.value(row, LogicalField::CustomerId)?;
        let balance = parse_decimal("balance", self.value(row, LogicalField::Balance)?)?;
        let amount = parse_decimal("amount", self.value(row, LogicalField::Amount)?)?;
        let timestamp = parse_timestamp(
            self.value(row, LogicalField::Date)?,
            self.value(row, LogicalField::Time)?,
        )?;
        let customer_ref = self.resolve_customer(customer_raw)?;

        Ok(TransactionRecord {
            id: ObjectId::new(),
            transaction_id,
            customer_ref,
            balance,
            amount,
            timestamp,
            kind: TransactionKind::from_amount(amount),
            created_at: self.now,
            updated_at: self.now,
        })
    }
}
