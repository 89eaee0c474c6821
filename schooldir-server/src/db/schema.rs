//! Schema for the `schools` table

use sqlx::PgPool;

/// Idempotent DDL for the only table.
///
/// `updated_at` has no ON UPDATE trigger; the repository sets it on every
/// UPDATE.
pub const CREATE_SCHOOLS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schools (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        address TEXT,
        city VARCHAR(100),
        state VARCHAR(100),
        contact_number VARCHAR(20),
        email VARCHAR(255),
        image VARCHAR(500),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Ensure the `schools` table exists.
pub async fn ensure_schools_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::debug!("ensuring schools table exists");
    sqlx::query(CREATE_SCHOOLS_TABLE).execute(pool).await?;
    Ok(())
}
