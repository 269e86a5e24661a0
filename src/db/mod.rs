use crate::models::{DailyClickRecord, Link, NewLink};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

#[cfg(test)]
mod memory;
mod postgres;

#[cfg(test)]
pub use memory::MemDb;
pub use postgres::PostgresDb;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    General(String),
    #[error("Duplicate Code Error")]
    DuplicateCode,
}

impl From<diesel::result::Error> for DbError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            // `url` conflicts are absorbed by the upsert, so a unique violation
            // here is always a code collision.
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DbError::DuplicateCode
            }
            _ => DbError::General(e.to_string()),
        }
    }
}

impl From<deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>> for DbError {
    fn from(e: deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>) -> Self {
        DbError::General(e.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinksDB: Send + Sync {
    /// Inserts `link`, or bumps `attempt_count` of the link already stored for
    /// `link.url`, in one statement. Returns the code now mapped to the url.
    async fn upsert(&self, link: &NewLink) -> Result<String, DbError>;
    async fn get(&self, code: &str) -> Result<Option<Link>, DbError>;
    async fn increment_clicks(&self, link_id: i32) -> Result<(), DbError>;
    async fn record_daily_click(&self, link_id: i32, date: NaiveDate) -> Result<(), DbError>;
    async fn daily_clicks(&self, link_id: i32) -> Result<Vec<DailyClickRecord>, DbError>;
}
