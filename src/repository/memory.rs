//! In-memory repository for handler tests.
//!
//! Every table scan counts as one logical query so tests can assert the
//! fetch cost does not grow with the number of users.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{company_ids, stitch, RepositoryError, UserRepository};
use crate::domain::{Company, Includes, Job, Quote, User, UserId, UserRecord};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
    companies: RwLock<Vec<Company>>,
    quotes: RwLock<Vec<Quote>>,
    jobs: RwLock<Vec<Job>>,
    queries: AtomicUsize,
    offline: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.users.write().push(user);
    }

    pub fn insert_company(&self, company: Company) {
        self.companies.write().push(company);
    }

    pub fn insert_quote(&self, quote: Quote) {
        self.quotes.write().push(quote);
    }

    pub fn insert_job(&self, job: Job) {
        self.jobs.write().push(job);
    }

    /// Make every call fail as if the store were unreachable
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn scan<T: Clone>(&self, table: &RwLock<Vec<T>>, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        table.read().iter().filter(|row| keep(row)).cloned().collect()
    }

    fn load_relations(&self, users: Vec<User>, includes: Includes) -> Vec<UserRecord> {
        if users.is_empty() {
            return Vec::new();
        }

        let user_ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
        let wanted_companies = company_ids(&users);

        let companies = if includes.company && !wanted_companies.is_empty() {
            self.scan(&self.companies, |c| wanted_companies.contains(&c.id))
        } else {
            Vec::new()
        };

        let mut quotes = if includes.quotes {
            self.scan(&self.quotes, |q| user_ids.contains(&q.user_id))
        } else {
            Vec::new()
        };
        quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let mut jobs = if includes.jobs {
            self.scan(&self.jobs, |j| user_ids.contains(&j.user_id))
        } else {
            Vec::new()
        };
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        stitch(users, companies, quotes, jobs)
    }
}

/// Newest first, id descending on ties
fn newest_first(a: &User, b: &User) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_users(&self, includes: Includes) -> Result<Vec<UserRecord>, RepositoryError> {
        self.check_online()?;
        let mut users = self.scan(&self.users, |_| true);
        users.sort_by(newest_first);
        Ok(self.load_relations(users, includes))
    }

    async fn find_user(
        &self,
        id: UserId,
        includes: Includes,
    ) -> Result<UserRecord, RepositoryError> {
        self.check_online()?;
        let users = self.scan(&self.users, |u| u.id == id);
        if users.is_empty() {
            return Err(RepositoryError::NotFound(id));
        }
        self.load_relations(users, includes)
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn user(id: i64, day: u32, company_id: Option<i64>) -> User {
        let at = Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap();
        User {
            id: UserId(id),
            email: format!("user{id}@example.com"),
            name: None,
            company_id,
            created_at: at,
            updated_at: at,
        }
    }

    fn seeded(n: i64) -> InMemoryUserRepository {
        let repo = InMemoryUserRepository::new();
        repo.insert_company(Company {
            id: 1,
            name: "Acme".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        });
        for id in 1..=n {
            repo.insert_user(user(id, 1 + (id % 28) as u32, Some(1)));
            repo.insert_quote(Quote {
                id: id * 10,
                user_id: UserId(id),
                reference: Some(format!("Q-{id}")),
                status: "sent".to_string(),
                total: Decimal::new(9_900, 2),
                created_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            });
            repo.insert_job(Job {
                id: id * 100,
                user_id: UserId(id),
                quote_id: Some(id * 10),
                title: format!("Install {id}"),
                status: "scheduled".to_string(),
                scheduled_for: None,
                created_at: Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap(),
            });
        }
        repo
    }

    #[rstest]
    #[case(1)]
    #[case(10)]
    #[case(250)]
    #[tokio::test]
    async fn listing_cost_does_not_grow_with_user_count(#[case] n: i64) {
        let repo = seeded(n);

        let records = repo.list_users(Includes::all()).await.unwrap();

        assert_eq!(records.len(), n as usize);
        assert!(records.iter().all(|r| r.company.is_some()));
        assert!(records.iter().all(|r| r.quotes.len() == 1 && r.jobs.len() == 1));
        assert_eq!(repo.query_count(), 4);
    }

    #[tokio::test]
    async fn find_costs_the_same_as_list() {
        let repo = seeded(5);

        let record = repo.find_user(UserId(3), Includes::all()).await.unwrap();

        assert_eq!(record.user.id, UserId(3));
        assert_eq!(record.quotes[0].id, 30);
        assert_eq!(record.jobs[0].id, 300);
        assert_eq!(repo.query_count(), 4);
    }

    #[tokio::test]
    async fn unrequested_relations_are_not_fetched() {
        let repo = seeded(5);

        let records = repo.list_users(Includes::default()).await.unwrap();

        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.company.is_none() && r.quotes.is_empty()));
        assert_eq!(repo.query_count(), 1);
    }

    #[test]
    fn newest_first_orders_by_created_at_then_id() {
        let mut users = vec![user(1, 1, None), user(2, 3, None), user(3, 2, None), user(4, 3, None)];
        users.sort_by(newest_first);
        let ids: Vec<i64> = users.iter().map(|u| u.id.0).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[tokio::test]
    async fn empty_store_skips_relation_queries() {
        let repo = InMemoryUserRepository::new();

        let records = repo.list_users(Includes::all()).await.unwrap();

        assert!(records.is_empty());
        assert_eq!(repo.query_count(), 1);
    }

    #[tokio::test]
    async fn offline_store_surfaces_database_error() {
        let repo = seeded(1);
        repo.go_offline();

        assert!(matches!(
            repo.list_users(Includes::all()).await,
            Err(RepositoryError::Database(_))
        ));
        assert!(repo.ping().await.is_err());
    }
}
