use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{Result, SeedError};
use crate::models::{Bill, Budget, Goal, User};
use crate::writer::{write_batch, DocumentSink};

pub const ALICE: ObjectId = ObjectId::from_bytes([0x60, 0x5c, 0x72, 0xef, 0x1b, 0x3f, 0x4e, 0x08, 0x4f, 0x8b, 0x45, 0x67]);
pub const BOB: ObjectId = ObjectId::from_bytes([0x60, 0x5c, 0x72, 0xef, 0x1b, 0x3f, 0x4e, 0x08, 0x4f, 0x8b, 0x45, 0x68]);
pub const CHARLIE: ObjectId = ObjectId::from_bytes([0x60, 0x5c, 0x72, 0xef, 0x1b, 0x3f, 0x4e, 0x08, 0x4f, 0x8b, 0x45, 0x69]);

pub const DEMO_USERS: &[ObjectId] = &[ALICE, BOB, CHARLIE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SeedSet {
    Users,
    Bills,
    Budgets,
    Goals,
    /// Users, bills, budgets and goals, in that order.
    All,
}

pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn day(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| SeedError::Other(format!("invalid fixture date {year}-{month}-{day}")))
}

// (id, name, email, provider, provider_id, username, password)
const USERS: &[(ObjectId, &str, &str, &str, &str, &str, &str)] = &[
    (ALICE, "Alice Johnson", "alice.johnson@example.com", "Google", "google987654", "alicej", "password123"),
    (BOB, "Bob Smith", "bob.smith@example.com", "Facebook", "facebook123456", "bobsmith", "securepassword"),
    (CHARLIE, "Charlie Brown", "charlie.brown@example.com", "Twitter", "twitter654321", "charlieb", "mysecurepassword"),
];

pub fn demo_users(now: DateTime<Utc>) -> Vec<User> {
    USERS
        .iter()
        .map(|&(id, name, email, provider, provider_id, username, password)| User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            provider: provider.to_string(),
            provider_id: provider_id.to_string(),
            username: username.to_string(),
            passwordhash: hash_password(password),
            profilepicture: String::new(),
            created_at: now,
        })
        .collect()
}

struct BillRow {
    user: ObjectId,
    name: &'static str,
    amount_due: f64,
    due: (i32, u32, u32),
    category: &'static str,
    pattern: &'static str,
    next_due: (i32, u32, u32),
}

const BILLS: &[BillRow] = &[
    BillRow { user: ALICE, name: "Electricity Bill", amount_due: 120.00, due: (2025, 4, 15), category: "Utilities", pattern: "monthly", next_due: (2025, 5, 15) },
    BillRow { user: BOB, name: "Netflix Subscription", amount_due: 15.99, due: (2025, 4, 20), category: "Entertainment", pattern: "monthly", next_due: (2025, 5, 20) },
    BillRow { user: CHARLIE, name: "Gym Membership", amount_due: 50.00, due: (2025, 4, 10), category: "Health & Fitness", pattern: "monthly", next_due: (2025, 5, 10) },
    BillRow { user: CHARLIE, name: "Car Insurance", amount_due: 450.00, due: (2025, 6, 1), category: "Insurance", pattern: "yearly", next_due: (2026, 6, 1) },
];

pub fn demo_bills(now: DateTime<Utc>) -> Result<Vec<Bill>> {
    BILLS
        .iter()
        .map(|b| {
            Ok(Bill {
                id: ObjectId::new(),
                user_id: b.user,
                bill_name: b.name.to_string(),
                amount_due: b.amount_due,
                due_date: day(b.due.0, b.due.1, b.due.2)?,
                category: b.category.to_string(),
                is_recurring: true,
                recurrence_pattern: b.pattern.to_string(),
                next_due_date: day(b.next_due.0, b.next_due.1, b.next_due.2)?,
                created_at: now,
            })
        })
        .collect()
}

// (user, name, amount, period, next_due)
const BUDGETS: &[(ObjectId, &str, f64, &str, (i32, u32, u32))] = &[
    (ALICE, "Monthly Groceries", 500.00, "monthly", (2025, 5, 1)),
    (BOB, "Entertainment", 200.00, "monthly", (2025, 5, 1)),
    (CHARLIE, "Health & Fitness", 100.00, "monthly", (2025, 5, 1)),
    (CHARLIE, "Vacation Fund", 1500.00, "yearly", (2026, 1, 1)),
];

pub fn demo_budgets(now: DateTime<Utc>) -> Result<Vec<Budget>> {
    BUDGETS
        .iter()
        .map(|&(user_id, name, amount, period, (y, m, d))| {
            Ok(Budget {
                id: ObjectId::new(),
                user_id,
                budget_name: name.to_string(),
                amount,
                period: period.to_string(),
                is_recurring: true,
                next_due_date: day(y, m, d)?,
                created_at: now,
            })
        })
        .collect()
}

struct GoalRow {
    user: ObjectId,
    name: &'static str,
    amount: f64,
    current: f64,
    deadline: (i32, u32, u32),
    goal_type: &'static str,
    links_bills: bool,
}

const GOALS: &[GoalRow] = &[
    GoalRow { user: ALICE, name: "Save for vacation", amount: 2000.00, current: 500.00, deadline: (2025, 12, 31), goal_type: "savings", links_bills: true },
    GoalRow { user: BOB, name: "Pay off credit card debt", amount: 1500.00, current: 800.00, deadline: (2025, 9, 1), goal_type: "debt repayment", links_bills: true },
    GoalRow { user: CHARLIE, name: "Build emergency fund", amount: 5000.00, current: 1200.00, deadline: (2026, 5, 1), goal_type: "savings", links_bills: false },
];

/// Goals link to the owner's first budget and, for some goals, the owner's
/// bills. Pass empty slices when those collections are not being seeded.
pub fn demo_goals(now: DateTime<Utc>, budgets: &[Budget], bills: &[Bill]) -> Result<Vec<Goal>> {
    GOALS
        .iter()
        .map(|g| {
            let related_budget_id = budgets.iter().find(|b| b.user_id == g.user).map(|b| b.id);
            let related_bills = if g.links_bills {
                bills.iter().filter(|b| b.user_id == g.user).map(|b| b.id).collect()
            } else {
                Vec::new()
            };
            Ok(Goal {
                id: ObjectId::new(),
                user_id: g.user,
                goal_name: g.name.to_string(),
                amount: g.amount,
                current_amount: g.current,
                deadline: day(g.deadline.0, g.deadline.1, g.deadline.2)?,
                goal_type: g.goal_type.to_string(),
                related_budget_id,
                related_bills,
                created_at: now,
                updated_at: now,
            })
        })
        .collect()
}

/// Insert one fixture set (or all of them). Each collection is one bulk
/// write; `All` stops at the first failure.
pub fn seed<S: DocumentSink>(set: SeedSet, sink: &mut S, now: DateTime<Utc>) -> Result<Vec<(&'static str, usize)>> {
    let mut results = Vec::new();
    match set {
        SeedSet::Users => results.push(("users", write_batch(sink, "users", &demo_users(now))?)),
        SeedSet::Bills => results.push(("bills", write_batch(sink, "bills", &demo_bills(now)?)?)),
        SeedSet::Budgets => results.push(("budgets", write_batch(sink, "budgets", &demo_budgets(now)?)?)),
        SeedSet::Goals => {
            let goals = demo_goals(now, &[], &[])?;
            results.push(("goals", write_batch(sink, "goals", &goals)?));
        }
        SeedSet::All => {
            let bills = demo_bills(now)?;
            let budgets = demo_budgets(now)?;
            let goals = demo_goals(now, &budgets, &bills)?;
            results.push(("users", write_batch(sink, "users", &demo_users(now))?));
            results.push(("bills", write_batch(sink, "bills", &bills)?));
            results.push(("budgets", write_batch(sink, "budgets", &budgets)?));
            results.push(("goals", write_batch(sink, "goals", &goals)?));
        }
    }
    for (collection, inserted) in &results {
        info!(collection, inserted, "seeded");
    }
    Ok(results)
}
