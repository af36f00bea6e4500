//! PostgreSQL user repository

use async_trait::async_trait;
use sqlx::PgPool;

use super::{company_ids, stitch, RepositoryError, UserRepository};
use crate::domain::{Company, Includes, Job, Quote, User, UserId, UserRecord};

const LIST_USERS_SQL: &str = "\
SELECT id, email, name, company_id, created_at, updated_at
FROM users
ORDER BY created_at DESC, id DESC";

const FIND_USER_SQL: &str = "\
SELECT id, email, name, company_id, created_at, updated_at
FROM users
WHERE id = $1";

const COMPANIES_BY_ID_SQL: &str = "\
SELECT id, name, created_at
FROM companies
WHERE id = ANY($1)";

const QUOTES_BY_USER_SQL: &str = "\
SELECT id, user_id, reference, status, total, created_at
FROM quotes
WHERE user_id = ANY($1)
ORDER BY created_at DESC, id DESC";

const JOBS_BY_USER_SQL: &str = "\
SELECT id, user_id, quote_id, title, status, scheduled_for, created_at
FROM jobs
WHERE user_id = ANY($1)
ORDER BY created_at DESC, id DESC";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve relations for an already fetched page of users.
    ///
    /// Returns the records and the number of queries issued (users excluded).
    async fn load_relations(
        &self,
        users: Vec<User>,
        includes: Includes,
    ) -> Result<(Vec<UserRecord>, usize), sqlx::Error> {
        if users.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let mut queries = 0;
        let user_ids: Vec<i64> = users.iter().map(|u| u.id.0).collect();

        let companies = match company_ids(&users) {
            ids if includes.company && !ids.is_empty() => {
                queries += 1;
                sqlx::query_as::<_, Company>(COMPANIES_BY_ID_SQL)
                    .bind(&ids)
                    .fetch_all(&self.pool)
                    .await?
            }
            _ => Vec::new(),
        };

        let quotes = if includes.quotes {
            queries += 1;
            sqlx::query_as::<_, Quote>(QUOTES_BY_USER_SQL)
                .bind(&user_ids)
                .fetch_all(&self.pool)
                .await?
        } else {
            Vec::new()
        };

        let jobs = if includes.jobs {
            queries += 1;
            sqlx::query_as::<_, Job>(JOBS_BY_USER_SQL)
                .bind(&user_ids)
                .fetch_all(&self.pool)
                .await?
        } else {
            Vec::new()
        };

        Ok((stitch(users, companies, quotes, jobs), queries))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list_users(&self, includes: Includes) -> Result<Vec<UserRecord>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(LIST_USERS_SQL)
            .fetch_all(&self.pool)
            .await?;

        let (records, queries) = self.load_relations(users, includes).await?;

        tracing::debug!(
            users = records.len(),
            relations = includes.count(),
            queries = queries + 1,
            "Listed users with relations"
        );

        Ok(records)
    }

    async fn find_user(
        &self,
        id: UserId,
        includes: Includes,
    ) -> Result<UserRecord, RepositoryError> {
        let user = sqlx::query_as::<_, User>(FIND_USER_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound(id))?;

        let (records, queries) = self.load_relations(vec![user], includes).await?;

        tracing::debug!(user_id = %id, queries = queries + 1, "Loaded user with relations");

        records
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
