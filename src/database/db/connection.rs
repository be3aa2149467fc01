use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

pub async fn get_db_pool(db_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

    let mut pool = SqlitePoolOptions::new().max_connections(5);
    if db_url.contains(":memory:") {
        // An in-memory database lives and dies with its single connection.
        pool = pool.max_connections(1).idle_timeout(None).max_lifetime(None);
    }

    pool.connect_with(options).await
}
