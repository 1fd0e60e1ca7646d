//! Database module
//!
//! Connection check, schema bootstrap and schema verification.

use sqlx::PgPool;

/// Tables the shop cannot run without
const REQUIRED_TABLES: &[&str] = &["users", "transfers", "inventory"];

/// Schema statements, applied in order. Each is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        coins BIGINT NOT NULL CHECK (coins >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transfers (
        id BIGSERIAL PRIMARY KEY,
        from_user_id UUID NOT NULL REFERENCES users (id),
        to_user_id UUID NOT NULL REFERENCES users (id),
        amount BIGINT NOT NULL CHECK (amount > 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CHECK (from_user_id <> to_user_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_transfers_from ON transfers (from_user_id)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_to ON transfers (to_user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        user_id UUID NOT NULL REFERENCES users (id),
        item_name TEXT NOT NULL,
        quantity BIGINT NOT NULL CHECK (quantity > 0),
        UNIQUE (user_id, item_name)
    )
    "#,
];

pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Advisory lock key held while the schema is bootstrapped
const MIGRATION_LOCK_KEY: i64 = 0x636f_696e_5f73_686f;

/// Create any missing tables and indexes.
///
/// Concurrent callers queue on an advisory lock; `CREATE ... IF NOT EXISTS`
/// alone still races on the catalog when two sessions run it together.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    for statement in SCHEMA.iter().copied() {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(statements = SCHEMA.len(), "Schema bootstrap complete");
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES.iter().copied() {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!(table, "Required table does not exist");
            return Ok(false);
        }
    }

    Ok(true)
}
