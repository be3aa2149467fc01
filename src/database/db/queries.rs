use sqlx::{Pool, Sqlite};

/*==========Client State Queries=========== */

pub async fn get_value(pool: &Pool<Sqlite>, key: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT value FROM client_state WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
}

pub async fn set_value(pool: &Pool<Sqlite>, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO client_state (key, value, updated_at)
        VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_value(pool: &Pool<Sqlite>, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM client_state WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}
