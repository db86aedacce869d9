//! Schema creation and evolution
//!
//! Table names match the database files written by earlier releases of the
//! bot so an existing `users.db` can be opened in place. Evolution steps are
//! idempotent and run once at startup:
//!
//! - `user` gains nullable `emoji` and `custom_name` columns when missing
//! - a `user` table that still carries `use_custom_name` is rebuilt without it
//! - a `storedmessage` table without `sender_name` is recreated
//! - `storedmessage` gains a nullable `origin_message` column when missing

use sqlx::SqlitePool;
use tracing::{info, instrument};

const CREATE_USER: &str = r#"
    CREATE TABLE IF NOT EXISTS "user" (
        id INTEGER PRIMARY KEY,
        user_id BIGINT NOT NULL UNIQUE,
        channel INTEGER NOT NULL,
        name TEXT NOT NULL,
        custom_name TEXT NULL,
        emoji TEXT NULL,
        created_at DATETIME
    )
"#;

const CREATE_PRISON: &str = r"
    CREATE TABLE IF NOT EXISTS prisonuser (
        id INTEGER PRIMARY KEY,
        user_id BIGINT NOT NULL UNIQUE,
        reason TEXT NOT NULL,
        until BIGINT NULL,
        created_at DATETIME
    )
";

const CREATE_STORED_MESSAGE: &str = r"
    CREATE TABLE IF NOT EXISTS storedmessage (
        id INTEGER PRIMARY KEY,
        sender_id BIGINT NOT NULL,
        sender_name TEXT NOT NULL,
        message_data TEXT NOT NULL,
        message TEXT NOT NULL,
        timestamp BIGINT NOT NULL,
        origin_message INTEGER NULL
    )
";

const CREATE_STORED_MESSAGE_ORIGIN_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS storedmessage_origin
    ON storedmessage (sender_id, origin_message)
";

/// Create missing tables and bring older layouts up to date
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_USER).execute(pool).await?;
    evolve_user_table(pool).await?;

    sqlx::query(CREATE_PRISON).execute(pool).await?;

    evolve_stored_messages(pool).await?;
    sqlx::query(CREATE_STORED_MESSAGE_ORIGIN_INDEX)
        .execute(pool)
        .await?;

    info!("Database schema is up to date");
    Ok(())
}

async fn evolve_user_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let columns = table_columns(pool, "user").await?;

    if !columns.iter().any(|c| c == "emoji") {
        sqlx::query(r#"ALTER TABLE "user" ADD COLUMN emoji TEXT NULL"#)
            .execute(pool)
            .await?;
        info!(column = "emoji", "Added column to user table");
    }
    if !columns.iter().any(|c| c == "custom_name") {
        sqlx::query(r#"ALTER TABLE "user" ADD COLUMN custom_name TEXT NULL"#)
            .execute(pool)
            .await?;
        info!(column = "custom_name", "Added column to user table");
    }

    if columns.iter().any(|c| c == "use_custom_name") {
        let mut tx = pool.begin().await?;
        sqlx::query(r#"ALTER TABLE "user" RENAME TO user_legacy"#)
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_USER).execute(&mut *tx).await?;
        sqlx::query(
            r#"
            INSERT INTO "user" (id, user_id, channel, name, custom_name, emoji, created_at)
            SELECT id, user_id, channel, name, custom_name, emoji, created_at
            FROM user_legacy
            "#,
        )
        .execute(&mut *tx)
        .await?;
        sqlx::query("DROP TABLE user_legacy")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Rebuilt user table without use_custom_name");
    }

    Ok(())
}

async fn evolve_stored_messages(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let columns = table_columns(pool, "storedmessage").await?;

    if !columns.is_empty() && !columns.iter().any(|c| c == "sender_name") {
        sqlx::query("DROP TABLE storedmessage").execute(pool).await?;
        info!("Dropped delivery log without sender_name");
    }

    sqlx::query(CREATE_STORED_MESSAGE).execute(pool).await?;

    let columns = table_columns(pool, "storedmessage").await?;
    if !columns.iter().any(|c| c == "origin_message") {
        sqlx::query("ALTER TABLE storedmessage ADD COLUMN origin_message INTEGER NULL")
            .execute(pool)
            .await?;
        info!(column = "origin_message", "Added column to storedmessage table");
    }

    Ok(())
}

/// Column names of a table, empty when the table does not exist
async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await
}
