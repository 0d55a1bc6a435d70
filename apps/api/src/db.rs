use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Idempotent schema. Expiration dates stay TEXT so malformed values from
/// upstream are kept verbatim instead of being rejected on insert.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS fridges (
        id         BIGSERIAL PRIMARY KEY,
        owner      TEXT NOT NULL,
        name       TEXT NOT NULL,
        color      TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fridge_members (
        fridge_id BIGINT NOT NULL REFERENCES fridges(id) ON DELETE CASCADE,
        user_id   TEXT NOT NULL,
        PRIMARY KEY (fridge_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        seq             BIGSERIAL,
        fridge_id       BIGINT NOT NULL REFERENCES fridges(id) ON DELETE CASCADE,
        item_id         BIGINT NOT NULL,
        name            TEXT NOT NULL,
        expiration_date TEXT,
        quantity        INTEGER NOT NULL CHECK (quantity >= 0),
        details         JSONB NOT NULL DEFAULT '{}'::jsonb,
        PRIMARY KEY (fridge_id, item_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shopping_entries (
        seq      BIGSERIAL,
        user_id  TEXT NOT NULL,
        name_key TEXT NOT NULL,
        name     TEXT NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        PRIMARY KEY (user_id, name_key)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_fridges_owner ON fridges (owner)",
    "CREATE INDEX IF NOT EXISTS idx_fridge_members_user ON fridge_members (user_id)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply inventory schema")?;
    }
    info!("Inventory schema ready ({} statements)", SCHEMA.len());
    Ok(())
}
