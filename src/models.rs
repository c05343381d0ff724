use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    /// Positive amounts are deposits; zero and below are withdrawals.
    pub fn from_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::Deposit
        } else {
            Self::Withdrawal
        }
    }
}

/// A validated transaction, ready for the `transactions` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub transaction_id: String,
    pub customer_ref: ObjectId,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Customer references a transaction may point at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerPool {
    ids: Vec<ObjectId>,
}

impl CustomerPool {
    pub fn new(ids: Vec<ObjectId>) -> Self {
        Self { ids }
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.ids.contains(id)
    }

    /// Uniform pick; `None` only for an empty pool.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ObjectId> {
        self.ids.choose(rng).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Demo fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub provider: String,
    pub provider_id: String,
    pub username: String,
    pub passwordhash: String,
    pub profilepicture: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub bill_name: String,
    pub amount_due: f64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub due_date: DateTime<Utc>,
    pub category: String,
    pub is_recurring: bool,
    pub recurrence_pattern: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub next_due_date: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub budget_name: String,
    pub amount: f64,
    pub period: String,
    pub is_recurring: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub next_due_date: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub goal_name: String,
    pub amount: f64,
    pub current_amount: f64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub deadline: DateTime<Utc>,
    pub goal_type: String,
    pub related_budget_id: Option<ObjectId>,
    pub related_bills: Vec<ObjectId>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_from_amount() {
        assert_eq!(TransactionKind::from_amount(dec!(250.00)), TransactionKind::Deposit);
        assert_eq!(TransactionKind::from_amount(dec!(0.01)), TransactionKind::Deposit);
        assert_eq!(TransactionKind::from_amount(dec!(0)), TransactionKind::Withdrawal);
        assert_eq!(TransactionKind::from_amount(dec!(-12.5)), TransactionKind::Withdrawal);
    }

    #[test]
    fn test_pool_choose_stays_in_pool() {
        let ids: Vec<ObjectId> = (0..3).map(|_| ObjectId::new()).collect();
        let pool = CustomerPool::new(ids.clone());
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let picked = pool.choose(&mut rng).unwrap();
            assert!(ids.contains(&picked));
        }
        assert_eq!(CustomerPool::default().choose(&mut rng), None);
    }

    #[test]
    fn test_record_serializes_to_bson_shape() {
        let now = Utc::now();
        let record = TransactionRecord {
            id: ObjectId::new(),
            transaction_id: "T1".to_string(),
            customer_ref: ObjectId::parse_str("605c72ef1b3f4e084f8b4567").unwrap(),
            balance: dec!(1000.50),
            amount: dec!(-25),
            timestamp: now,
            kind: TransactionKind::Withdrawal,
            created_at: now,
            updated_at: now,
        };
        let doc = bson::to_document(&record).unwrap();
        assert!(doc.get_object_id("_id").is_ok());
        assert_eq!(doc.get_str("transaction_id").unwrap(), "T1");
        assert_eq!(doc.get_f64("balance").unwrap(), 1000.5);
        assert_eq!(doc.get_f64("amount").unwrap(), -25.0);
        assert_eq!(doc.get_str("kind").unwrap(), "withdrawal");
        assert!(doc.get_datetime("timestamp").is_ok());
        assert_eq!(
            doc.get_object_id("customer_ref").unwrap().to_hex(),
            "605c72ef1b3f4e084f8b4567"
        );
    }
}
