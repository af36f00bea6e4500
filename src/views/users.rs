//! `index` and `show` views for admin users

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::DataResponse;
use crate::domain::{Company, Job, Quote, UserId, UserRecord};

/// A user as rendered to admin clients, relations inlined
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub company: Option<Company>,
    pub quotes: Vec<Quote>,
    pub jobs: Vec<Job>,
}

impl From<UserRecord> for UserView {
    fn from(record: UserRecord) -> Self {
        let UserRecord {
            user,
            company,
            quotes,
            jobs,
        } = record;

        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
            company,
            quotes,
            jobs,
        }
    }
}

pub fn index(users: Vec<UserRecord>) -> DataResponse<Vec<UserView>> {
    tracing::debug!(view = "index", users = users.len(), "Rendering admin users");
    DataResponse::new(users.into_iter().map(UserView::from).collect())
}

pub fn show(user: UserRecord) -> DataResponse<UserView> {
    tracing::debug!(view = "show", user_id = %user.user.id, "Rendering admin user");
    DataResponse::new(user.into())
}
