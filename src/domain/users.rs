//! User domain types
//!
//! Users and the records hanging off them (company, quotes, jobs) as the
//! admin surface reads them. Nothing here is mutated by this service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Unique, immutable user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// User row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub company_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Company a user belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Quote issued by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Quote {
    pub id: i64,
    pub user_id: UserId,
    pub reference: Option<String>,
    pub status: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Job owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub user_id: UserId,
    pub quote_id: Option<i64>,
    pub title: String,
    pub status: String,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A user with its eagerly loaded relations.
///
/// Relations that were not requested stay empty (`None` / `[]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: User,
    pub company: Option<Company>,
    pub quotes: Vec<Quote>,
    pub jobs: Vec<Job>,
}

/// Relations a fetch should resolve alongside each user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Includes {
    pub company: bool,
    pub quotes: bool,
    pub jobs: bool,
}

impl Includes {
    pub const fn all() -> Self {
        Self {
            company: true,
            quotes: true,
            jobs: true,
        }
    }

    /// Number of relations requested
    pub fn count(&self) -> usize {
        [self.company, self.quotes, self.jobs]
            .iter()
            .filter(|included| **included)
            .count()
    }
}
