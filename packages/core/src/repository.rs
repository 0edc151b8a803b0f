//! Database repository for outage persistence.
//!
//! Outages live in one table keyed like a range store: the Latin location
//! title is the partition key and the RFC 3339 outage start (always in the
//! source offset) is the sort key. Because every sort key shares one
//! fixed-width format, "upcoming" queries are plain string comparisons.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};
use sqlx::{Row, SqlitePool};

use crate::outage::{
    error::StoreError,
    provider::OutageStore,
    types::{source_offset, Location, OutageRecord},
};
use crate::retry::{is_transient_db_error, RetryPolicy};

/// Repository for reading and writing outages to SQLite.
pub struct OutageRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

/// Serialize a timestamp as a sort key, e.g. `2023-09-08T19:20:00+04:00`.
pub fn sort_key<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&source_offset())
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Drop repeated addresses, keeping the first occurrence of each.
pub fn dedup_addresses(addresses: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(addresses.len());
    addresses
        .iter()
        .filter(|addr| seen.insert(addr.as_str()))
        .cloned()
        .collect()
}

/// One row ready for binding.
struct OutageRow<'a> {
    record: &'a OutageRecord,
    outage_start: String,
    outage_end: String,
    addresses_ge: String,
}

impl<'a> OutageRow<'a> {
    fn encode(record: &'a OutageRecord) -> Result<Self, StoreError> {
        let addresses_ge = serde_json::to_string(&dedup_addresses(&record.addresses_ge))
            .map_err(|source| StoreError::Encode { source })?;

        Ok(Self {
            record,
            outage_start: sort_key(&record.start),
            outage_end: sort_key(&record.end),
            addresses_ge,
        })
    }
}

impl OutageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Total number of stored outages.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM water_outages")
            .fetch_one(&self.pool)
            .await
            .map_err(|source| StoreError::Query { source })?;

        row.try_get("n").map_err(|source| StoreError::Query { source })
    }

    /// Upsert every row in a single transaction.
    async fn write_batch(&self, rows: &[OutageRow<'_>]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            let location = &row.record.location;

            sqlx::query(
                "INSERT INTO water_outages
                 (location_title, outage_start, outage_end, title_ge, affected_customers,
                  location_lat, location_lng, addresses_ge, location_id)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT (location_title, outage_start) DO UPDATE SET
                    outage_end = excluded.outage_end,
                    title_ge = excluded.title_ge,
                    affected_customers = excluded.affected_customers,
                    location_lat = excluded.location_lat,
                    location_lng = excluded.location_lng,
                    addresses_ge = excluded.addresses_ge,
                    location_id = excluded.location_id",
            )
            .bind(&location.title_lat)
            .bind(&row.outage_start)
            .bind(&row.outage_end)
            .bind(&location.title_ge)
            .bind(i64::from(row.record.affected_customers))
            .bind(&location.lat)
            .bind(&location.lng)
            .bind(&row.addresses_ge)
            .bind(&location.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl OutageStore for OutageRepository {
    async fn save_batch(&self, records: &[OutageRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let rows = records
            .iter()
            .map(OutageRow::encode)
            .collect::<Result<Vec<_>, _>>()?;

        self.retry
            .run(is_transient_db_error, || self.write_batch(&rows))
            .await
            .map_err(|source| StoreError::Save { source })?;

        tracing::info!(saved = rows.len(), "saving outages");
        Ok(())
    }

    async fn query_upcoming(
        &self,
        title_lat: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutageRecord>, StoreError> {
        let now_key = sort_key(&now);

        let rows = self
            .retry
            .run(is_transient_db_error, || {
                sqlx::query(
                    "SELECT location_title, outage_start, outage_end, title_ge, affected_customers,
                            location_lat, location_lng, addresses_ge, location_id
                     FROM water_outages
                     WHERE location_title = ? AND outage_start > ?
                     ORDER BY outage_start ASC",
                )
                .bind(title_lat)
                .bind(&now_key)
                .fetch_all(&self.pool)
            })
            .await
            .map_err(|source| StoreError::Query { source })?;

        rows.iter().map(decode_row).collect()
    }
}

fn decode_row(row: &sqlx::sqlite::SqliteRow) -> Result<OutageRecord, StoreError> {
    let get = |column: &str| -> Result<String, StoreError> {
        row.try_get(column).map_err(|source| StoreError::Query { source })
    };

    let title_lat = get("location_title")?;
    let raw_start = get("outage_start")?;
    let key = format!("{title_lat}/{raw_start}");

    let corrupt = |message: String| StoreError::Corrupt {
        key: key.clone(),
        message,
    };

    let parse_time = |raw: &str| -> Result<DateTime<FixedOffset>, StoreError> {
        DateTime::parse_from_rfc3339(raw).map_err(|err| corrupt(format!("timestamp '{raw}': {err}")))
    };

    let start = parse_time(&raw_start)?;
    let end = parse_time(&get("outage_end")?)?;

    let affected: i64 = row
        .try_get("affected_customers")
        .map_err(|source| StoreError::Query { source })?;
    let affected_customers = u32::try_from(affected)
        .map_err(|_| corrupt(format!("affected customers {affected}")))?;

    let addresses_ge: Vec<String> = serde_json::from_str(&get("addresses_ge")?)
        .map_err(|err| corrupt(format!("addresses: {err}")))?;

    Ok(OutageRecord {
        location: Location {
            id: get("location_id")?,
            title_ge: get("title_ge")?,
            title_lat,
            lat: get("location_lat")?,
            lng: get("location_lng")?,
        },
        start,
        end,
        affected_customers,
        addresses_ge,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::db::create_pool;

    async fn make_repo() -> OutageRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        OutageRepository::new(pool)
    }

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        source_offset()
            .with_ymd_and_hms(2023, 9, day, hour, 20, 0)
            .unwrap()
    }

    fn make_outage(title_lat: &str, start: DateTime<FixedOffset>, affected: u32) -> OutageRecord {
        OutageRecord {
            location: Location {
                id: "12".into(),
                title_ge: "ოზურგეთი".into(),
                title_lat: title_lat.into(),
                lat: "41.9242".into(),
                lng: "42.0064".into(),
            },
            start,
            end: start + Duration::days(3),
            affected_customers: affected,
            addresses_ge: vec!["ოზურგეთი ქ. N 15".into(), "ოზურგეთი ქ. N 5".into()],
        }
    }

    #[test]
    fn sort_key_uses_source_offset() {
        let utc = Utc.with_ymd_and_hms(2023, 9, 8, 15, 20, 0).unwrap();
        assert_eq!(sort_key(&utc), "2023-09-08T19:20:00+04:00");
        assert_eq!(sort_key(&at(8, 19)), "2023-09-08T19:20:00+04:00");
    }

    #[test]
    fn sort_keys_order_like_timestamps() {
        let earlier = sort_key(&at(8, 9));
        let later = sort_key(&at(8, 19));
        assert!(earlier < later);
        assert!(sort_key(&at(9, 0)) > later);
    }

    #[test]
    fn dedup_addresses_keeps_first_occurrences() {
        let addresses: Vec<String> = ["a", "b", "a", "c", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(dedup_addresses(&addresses), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn save_then_query_before_start_returns_record() {
        let repo = make_repo().await;
        let outage = make_outage("ozurgeti", at(8, 19), 186);

        repo.save_batch(std::slice::from_ref(&outage)).await.unwrap();

        let before_start = outage.start.with_timezone(&Utc) - Duration::minutes(1);
        let fetched = repo.query_upcoming("ozurgeti", before_start).await.unwrap();

        assert_eq!(fetched, vec![outage]);
    }

    #[tokio::test]
    async fn query_after_start_excludes_record() {
        let repo = make_repo().await;
        let outage = make_outage("ozurgeti", at(8, 19), 186);
        repo.save_batch(std::slice::from_ref(&outage)).await.unwrap();

        let after_start = outage.start.with_timezone(&Utc) + Duration::minutes(1);
        assert!(repo.query_upcoming("ozurgeti", after_start).await.unwrap().is_empty());

        let exactly_start = outage.start.with_timezone(&Utc);
        assert!(repo.query_upcoming("ozurgeti", exactly_start).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn query_is_scoped_to_partition() {
        let repo = make_repo().await;
        repo.save_batch(&[
            make_outage("ozurgeti", at(8, 19), 1),
            make_outage("batumi", at(8, 19), 2),
        ])
        .await
        .unwrap();

        let now = at(1, 0).with_timezone(&Utc);
        let fetched = repo.query_upcoming("batumi", now).await.unwrap();

        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].affected_customers, 2);
    }

    #[tokio::test]
    async fn same_key_overwrites_with_last_write() {
        let repo = make_repo().await;
        repo.save_batch(&[make_outage("ozurgeti", at(8, 19), 100)]).await.unwrap();
        repo.save_batch(&[make_outage("ozurgeti", at(8, 19), 250)]).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);

        let now = at(1, 0).with_timezone(&Utc);
        let fetched = repo.query_upcoming("ozurgeti", now).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].affected_customers, 250);
    }

    #[tokio::test]
    async fn duplicate_keys_within_one_batch_keep_the_later_record() {
        let repo = make_repo().await;
        repo.save_batch(&[
            make_outage("ozurgeti", at(8, 19), 100),
            make_outage("ozurgeti", at(8, 19), 300),
        ])
        .await
        .unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let fetched = repo
            .query_upcoming("ozurgeti", at(1, 0).with_timezone(&Utc))
            .await
            .unwrap();
        assert_eq!(fetched[0].affected_customers, 300);
    }

    #[tokio::test]
    async fn addresses_are_deduplicated_on_write() {
        let repo = make_repo().await;
        let mut outage = make_outage("ozurgeti", at(8, 19), 1);
        outage.addresses_ge = vec!["x".into(), "y".into(), "x".into()];
        repo.save_batch(&[outage]).await.unwrap();

        let fetched = repo
            .query_upcoming("ozurgeti", at(1, 0).with_timezone(&Utc))
            .await
            .unwrap();
        assert_eq!(fetched[0].addresses_ge, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn upcoming_results_are_ascending_by_start() {
        let repo = make_repo().await;
        repo.save_batch(&[
            make_outage("ozurgeti", at(20, 9), 3),
            make_outage("ozurgeti", at(10, 9), 1),
            make_outage("ozurgeti", at(15, 9), 2),
        ])
        .await
        .unwrap();

        let fetched = repo
            .query_upcoming("ozurgeti", at(1, 0).with_timezone(&Utc))
            .await
            .unwrap();
        let counts: Vec<u32> = fetched.iter().map(|o| o.affected_customers).collect();
        assert_eq!(counts, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let repo = make_repo().await;
        repo.save_batch(&[]).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn closed_pool_surfaces_a_single_save_error() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let repo = OutageRepository::new(pool.clone())
            .with_retry_policy(RetryPolicy::default().with_max_attempts(1));
        pool.close().await;

        let err = repo
            .save_batch(&[make_outage("ozurgeti", at(8, 19), 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Save { .. }));
    }
}
