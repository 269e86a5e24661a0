use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::{
    db::{DbError, LinksDB},
    models::{DailyClickRecord, Link, NewLink},
};

#[derive(Debug, Default)]
struct Tables {
    links: Vec<Link>,
    clicks: BTreeMap<(i32, NaiveDate), i32>,
}

/// In-process `LinksDB` with the same uniqueness rules as the postgres schema.
#[derive(Debug, Default)]
pub struct MemDb {
    tables: Mutex<Tables>,
}

impl MemDb {
    pub async fn daily_count(&self, link_id: i32, date: NaiveDate) -> Option<i32> {
        self.tables
            .lock()
            .await
            .clicks
            .get(&(link_id, date))
            .copied()
    }
}

#[async_trait]
impl LinksDB for MemDb {
    async fn upsert(&self, link: &NewLink) -> Result<String, DbError> {
        let mut tables = self.tables.lock().await;

        if let Some(existing) = tables.links.iter_mut().find(|l| l.url == link.url) {
            existing.attempt_count += 1;
            return Ok(existing.code.clone());
        }

        if tables.links.iter().any(|l| l.code == link.code) {
            return Err(DbError::DuplicateCode);
        }

        let id = tables.links.len() as i32 + 1;
        tables.links.push(Link {
            id,
            code: link.code.clone(),
            url: link.url.clone(),
            created_at: link.created_at,
            attempt_count: link.attempt_count,
            click_count: link.click_count,
        });

        Ok(link.code.clone())
    }

    async fn get(&self, code: &str) -> Result<Option<Link>, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables.links.iter().find(|l| l.code == code).cloned())
    }

    async fn increment_clicks(&self, link_id: i32) -> Result<(), DbError> {
        let mut tables = self.tables.lock().await;

        let link = tables
            .links
            .iter_mut()
            .find(|l| l.id == link_id)
            .ok_or_else(|| DbError::General(format!("no link with id {link_id}")))?;
        link.click_count += 1;

        Ok(())
    }

    async fn record_daily_click(&self, link_id: i32, date: NaiveDate) -> Result<(), DbError> {
        let mut tables = self.tables.lock().await;
        *tables.clicks.entry((link_id, date)).or_insert(0) += 1;
        Ok(())
    }

    async fn daily_clicks(&self, link_id: i32) -> Result<Vec<DailyClickRecord>, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .clicks
            .iter()
            .filter(|((id, _), _)| *id == link_id)
            .map(|(&(link_id, date), &count)| DailyClickRecord {
                link_id,
                date,
                count,
            })
            .collect())
    }
}
