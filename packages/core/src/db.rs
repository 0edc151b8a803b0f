//! SQLite pool construction and schema provisioning.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Open a pool for `database_url` and apply all embedded migrations.
///
/// In-memory databases live per connection, so those pools are pinned
/// to a single connection that is never recycled.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };

    sqlx::migrate!().run(&pool).await?;
    tracing::debug!(database_url, "database ready");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_pool_provisions_outage_table() {
        let pool = create_pool("sqlite::memory:").await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM water_outages")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
    }
}
