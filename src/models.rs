use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use sha2::{Digest, Sha256};
use tinylink_rs::{DailyClicks, LinkStats};

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewLink {
    pub code: String,
    pub url: String,
    pub url_hash: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub attempt_count: i32,
    pub click_count: i32,
}

/// Key links are deduplicated on. Urls of any length hash to 32 bytes.
pub fn url_hash(url: &str) -> Vec<u8> {
    Sha256::digest(url.as_bytes()).to_vec()
}

impl NewLink {
    /// A link as stored on the first shorten request for its url.
    pub fn first_attempt(code: String, url: String) -> Self {
        Self {
            code,
            url_hash: url_hash(&url),
            url,
            created_at: Utc::now(),
            attempt_count: 1,
            click_count: 0,
        }
    }
}

#[derive(Queryable, Selectable, Clone, PartialEq, Eq, Debug)]
#[diesel(table_name = crate::schema::links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Link {
    pub id: i32,
    pub code: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub attempt_count: i32,
    pub click_count: i32,
}

impl From<Link> for LinkStats {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            code: link.code,
            url: link.url,
            created_at: link.created_at,
            attempt_count: link.attempt_count,
            click_count: link.click_count,
        }
    }
}

#[derive(Queryable, Selectable, Clone, PartialEq, Eq, Debug)]
#[diesel(table_name = crate::schema::clicks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DailyClickRecord {
    pub link_id: i32,
    pub date: NaiveDate,
    pub count: i32,
}

impl From<DailyClickRecord> for DailyClicks {
    fn from(record: DailyClickRecord) -> Self {
        Self {
            date: record.date,
            clicks: record.count,
        }
    }
}
