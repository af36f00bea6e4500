//! User data access
//!
//! Handlers only see the [`UserRepository`] trait. Implementations resolve
//! the relations named by [`Includes`] in batches: one fetch for the users,
//! then at most one fetch per relation, never one per user.

mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgUserRepository;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{Company, Includes, Job, Quote, User, UserId, UserRecord};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("user {0} not found")]
    NotFound(UserId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user, newest first, with the requested relations loaded.
    async fn list_users(&self, includes: Includes) -> Result<Vec<UserRecord>, RepositoryError>;

    /// One user with the requested relations, or `NotFound`.
    async fn find_user(
        &self,
        id: UserId,
        includes: Includes,
    ) -> Result<UserRecord, RepositoryError>;

    /// Round trip to the store for health checks.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Attach batched relation rows to their users.
///
/// `users` order is preserved. Child rows keep the order they arrived in,
/// so callers fetch them already sorted. Rows pointing at a user that is
/// not in `users` are dropped.
pub fn stitch(
    users: Vec<User>,
    companies: Vec<Company>,
    quotes: Vec<Quote>,
    jobs: Vec<Job>,
) -> Vec<UserRecord> {
    let companies: HashMap<i64, Company> = companies.into_iter().map(|c| (c.id, c)).collect();

    let mut quotes_by_user: HashMap<UserId, Vec<Quote>> = HashMap::new();
    for quote in quotes {
        quotes_by_user.entry(quote.user_id).or_default().push(quote);
    }

    let mut jobs_by_user: HashMap<UserId, Vec<Job>> = HashMap::new();
    for job in jobs {
        jobs_by_user.entry(job.user_id).or_default().push(job);
    }

    users
        .into_iter()
        .map(|user| UserRecord {
            company: user.company_id.and_then(|id| companies.get(&id).cloned()),
            quotes: quotes_by_user.remove(&user.id).unwrap_or_default(),
            jobs: jobs_by_user.remove(&user.id).unwrap_or_default(),
            user,
        })
        .collect()
}

/// Distinct company ids referenced by `users`
pub fn company_ids(users: &[User]) -> Vec<i64> {
    let mut ids: Vec<i64> = users.iter().filter_map(|u| u.company_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
