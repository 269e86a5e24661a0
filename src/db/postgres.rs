use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    db::LinksDB,
    db_pool::DbPool,
    models::{DailyClickRecord, Link, NewLink},
    schema,
};

#[derive(Clone)]
pub struct PostgresDb {
    db: DbPool,
}

impl PostgresDb {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LinksDB for PostgresDb {
    async fn upsert(&self, link: &NewLink) -> Result<String, super::DbError> {
        use diesel::ExpressionMethods;
        use diesel_async::RunQueryDsl;
        use schema::links;

        Ok(diesel::insert_into(links::table)
            .values(link)
            .on_conflict(links::url_hash)
            .do_update()
            .set(links::attempt_count.eq(links::attempt_count + 1))
            .returning(links::code)
            .get_result::<String>(&mut self.db.0.get().await?)
            .await?)
    }

    async fn get(&self, code: &str) -> Result<Option<Link>, super::DbError> {
        use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
        use diesel_async::RunQueryDsl;

        Ok(schema::links::table
            .filter(schema::links::code.eq(code))
            .select(Link::as_select())
            .first(&mut self.db.0.get().await?)
            .await
            .optional()?)
    }

    async fn increment_clicks(&self, link_id: i32) -> Result<(), super::DbError> {
        use diesel::{ExpressionMethods, QueryDsl};
        use diesel_async::RunQueryDsl;
        use schema::links;

        let affected = diesel::update(links::table.filter(links::id.eq(link_id)))
            .set(links::click_count.eq(links::click_count + 1))
            .execute(&mut self.db.0.get().await?)
            .await?;

        if affected != 1 {
            return Err(super::DbError::General(format!(
                "no link with id {link_id} to count click for"
            )));
        }

        Ok(())
    }

    async fn record_daily_click(&self, link_id: i32, date: NaiveDate) -> Result<(), super::DbError> {
        use diesel::ExpressionMethods;
        use diesel_async::RunQueryDsl;
        use schema::clicks;

        diesel::insert_into(clicks::table)
            .values((
                clicks::link_id.eq(link_id),
                clicks::date.eq(date),
                clicks::count.eq(1),
            ))
            .on_conflict((clicks::link_id, clicks::date))
            .do_update()
            .set(clicks::count.eq(clicks::count + 1))
            .execute(&mut self.db.0.get().await?)
            .await?;

        Ok(())
    }

    async fn daily_clicks(&self, link_id: i32) -> Result<Vec<DailyClickRecord>, super::DbError> {
        use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
        use diesel_async::RunQueryDsl;
        use schema::clicks;

        Ok(clicks::table
            .filter(clicks::link_id.eq(link_id))
            .order(clicks::date.asc())
            .select(DailyClickRecord::as_select())
            .load(&mut self.db.0.get().await?)
            .await?)
    }
}

#[cfg(test)]
mod e2e_tests {
    use super::*;
    use crate::{
        db::DbError,
        db_pool::{DbPool, init_crypto_provider},
        migrations::run_migrations,
    };
    use chrono::Utc;
    use testcontainers::{ContainerAsync, runners::AsyncRunner};
    use testcontainers_modules::postgres::Postgres;

    async fn get_postgres_db() -> (ContainerAsync<Postgres>, PostgresDb) {
        init_crypto_provider();

        let c = Postgres::default().start().await.unwrap();

        let host_port = c.get_host_port_ipv4(5432).await.unwrap();
        let host = c.get_host().await.unwrap();

        let db_url = format!("postgres://postgres:postgres@{host}:{host_port}/postgres",);

        run_migrations(&db_url).unwrap();

        let pool = DbPool::build(&db_url, 2).await.unwrap();

        (c, PostgresDb::new(pool))
    }

    #[tokio::test]
    #[ignore = "needs a docker daemon"]
    async fn test_upsert_dedupes_on_url() {
        let (_container, db) = get_postgres_db().await;

        let url = String::from("https://www.rust-lang.org");

        let first = db
            .upsert(&NewLink::first_attempt("abc123".into(), url.clone()))
            .await
            .unwrap();
        let second = db
            .upsert(&NewLink::first_attempt("zzz999".into(), url.clone()))
            .await
            .unwrap();

        assert_eq!(first, "abc123");
        assert_eq!(second, "abc123");

        let link = db.get("abc123").await.unwrap().unwrap();
        assert_eq!(link.url, url);
        assert_eq!(link.attempt_count, 2);
        assert_eq!(link.click_count, 0);

        assert!(db.get("zzz999").await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "needs a docker daemon"]
    async fn test_code_collision_is_reported() {
        let (_container, db) = get_postgres_db().await;

        db.upsert(&NewLink::first_attempt("abc123".into(), "https://a.example".into()))
            .await
            .unwrap();

        let res = db
            .upsert(&NewLink::first_attempt("abc123".into(), "https://b.example".into()))
            .await;

        assert!(matches!(res, Err(DbError::DuplicateCode)));
    }

    #[tokio::test]
    #[ignore = "needs a docker daemon"]
    async fn test_clicks_accumulate_per_day() {
        let (_container, db) = get_postgres_db().await;

        db.upsert(&NewLink::first_attempt("abc123".into(), "https://a.example".into()))
            .await
            .unwrap();
        let link = db.get("abc123").await.unwrap().unwrap();

        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap();

        for _ in 0..3 {
            db.increment_clicks(link.id).await.unwrap();
            db.record_daily_click(link.id, today).await.unwrap();
        }
        db.record_daily_click(link.id, yesterday).await.unwrap();

        let link = db.get("abc123").await.unwrap().unwrap();
        assert_eq!(link.click_count, 3);

        let daily = db.daily_clicks(link.id).await.unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!((daily[0].date, daily[0].count), (yesterday, 1));
        assert_eq!((daily[1].date, daily[1].count), (today, 3));
    }

    #[tokio::test]
    #[ignore = "needs a docker daemon"]
    async fn test_increment_unknown_link_fails() {
        let (_container, db) = get_postgres_db().await;

        assert!(db.increment_clicks(4242).await.is_err());
    }

    #[tokio::test]
    #[ignore = "needs a docker daemon"]
    async fn test_upsert_accepts_long_urls() {
        use rand::{Rng, distr::Alphanumeric};

        let (_container, db) = get_postgres_db().await;

        let noise: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(10_000)
            .map(char::from)
            .collect();
        let url = format!("https://example.com/?q={noise}");

        let first = db
            .upsert(&NewLink::first_attempt("abc123".into(), url.clone()))
            .await
            .unwrap();
        let second = db
            .upsert(&NewLink::first_attempt("zzz999".into(), url.clone()))
            .await
            .unwrap();

        assert_eq!(first, "abc123");
        assert_eq!(second, "abc123");

        let link = db.get("abc123").await.unwrap().unwrap();
        assert_eq!(link.url, url);
        assert_eq!(link.attempt_count, 2);
    }
}
