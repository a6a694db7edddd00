use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

pub async fn init_db(db_path: &Path) -> Result<SqlitePool, String> {
    let db_url = format!("sqlite:{}", db_path.to_string_lossy());

    let options = SqliteConnectOptions::from_str(&db_url)
        .map_err(|e| e.to_string())?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| format!("Failed to connect to database: {}", e))?;

    migrate(&pool).await?;
    Ok(pool)
}

/// 单连接的内存数据库 (测试用)
pub async fn init_memory_db() -> Result<SqlitePool, String> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| format!("Failed to open in-memory database: {}", e))?;

    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), String> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS configs (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
    .execute(pool)
    .await
    .map_err(|e| format!("Failed to create configs table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS subscriptions (
            position INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            added_at TEXT NOT NULL
        );",
    )
    .execute(pool)
    .await
    .map_err(|e| format!("Failed to create subscriptions table: {}", e))?;

    Ok(())
}
