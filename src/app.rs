use crate::{
    codegen::ShortCodes,
    db::{DbError, LinksDB},
    models::{DailyClickRecord, Link, NewLink},
};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("url must not be empty")]
    EmptyUrl,
    #[error("unknown code")]
    UnknownCode,
    #[error(transparent)]
    Db(#[from] DbError),
}

pub struct App {
    db: Arc<dyn LinksDB>,
    codes: ShortCodes,
}

impl App {
    pub fn new(db: Arc<dyn LinksDB>, codes: ShortCodes) -> Arc<Self> {
        Arc::new(Self { db, codes })
    }

    /// Returns the code for `url`, creating the link on first sight.
    ///
    /// Repeat submissions of the same url return the stored code and count as
    /// an attempt.
    #[instrument(skip(self), err)]
    pub async fn shorten(&self, url: &str) -> Result<String, LinkError> {
        if url.trim().is_empty() {
            return Err(LinkError::EmptyUrl);
        }

        let new_link = NewLink::first_attempt(self.codes.generate(), url.to_string());

        let code = self.db.upsert(&new_link).await.inspect_err(|e| {
            error!(url, candidate = %new_link.code, "storing link failed: {e}");
        })?;

        if code == new_link.code {
            info!(code, "link created");
        } else {
            info!(code, "link exists");
        }

        Ok(code)
    }

    pub async fn stats(&self, code: &str) -> Result<Link, LinkError> {
        self.lookup(code).await
    }

    #[instrument(skip(self))]
    pub async fn daily_clicks(&self, code: &str) -> Result<Vec<DailyClickRecord>, LinkError> {
        let link = self.lookup(code).await?;

        Ok(self.db.daily_clicks(link.id).await.inspect_err(|e| {
            error!(code, "loading daily clicks failed: {e}");
        })?)
    }

    /// Resolves `code` to its url and records the click.
    ///
    /// Counting is best-effort: a failed counter update is logged and the url
    /// is returned anyway.
    #[instrument(skip(self))]
    pub async fn resolve(&self, code: &str) -> Result<String, LinkError> {
        let link = self.lookup(code).await?;

        if let Err(e) = self.db.increment_clicks(link.id).await {
            error!(code, link_id = link.id, "updating click count failed: {e}");
        }

        let today = Utc::now().date_naive();
        if let Err(e) = self.db.record_daily_click(link.id, today).await {
            error!(code, link_id = link.id, %today, "updating daily clicks failed: {e}");
        }

        info!(code, "resolved");

        Ok(link.url)
    }

    async fn lookup(&self, code: &str) -> Result<Link, LinkError> {
        let link = self.db.get(code).await.inspect_err(|e| {
            error!(code, "looking up link failed: {e}");
        })?;

        link.ok_or(LinkError::UnknownCode)
    }
}
