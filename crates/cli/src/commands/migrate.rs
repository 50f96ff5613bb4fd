//! Apply the PostgreSQL schema.
//!
//! Every statement is idempotent, so running this against an up-to-date
//! database is a no-op.

use medassist_storage::{PgStorage, run_pg_migrations};

use crate::database_url;

pub(crate) async fn run() -> anyhow::Result<()> {
    let url = database_url()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set for migrate"))?;
    let storage = PgStorage::connect(&url).await?;
    run_pg_migrations(storage.pool()).await?;
    println!("Migrations applied");
    Ok(())
}
