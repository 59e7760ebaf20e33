use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS forecast_snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        region TEXT NOT NULL,
        forecast TEXT NOT NULL,
        captured_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS crop_recommendations (
        id TEXT PRIMARY KEY,
        farmer_id TEXT,
        soil_type TEXT NOT NULL,
        rainfall REAL NOT NULL,
        temperature REAL NOT NULL,
        recommended_crops TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS insight_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        region TEXT NOT NULL,
        insights TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    "#,
    // Migration 2: Add indexes
    r#"
    CREATE INDEX IF NOT EXISTS idx_forecast_snapshots_captured_at
        ON forecast_snapshots(captured_at);
    CREATE INDEX IF NOT EXISTS idx_forecast_snapshots_region
        ON forecast_snapshots(region);
    CREATE INDEX IF NOT EXISTS idx_crop_recommendations_farmer
        ON crop_recommendations(farmer_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_insight_logs_region
        ON insight_logs(region, created_at);
    "#,
];

pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        let current_version: i32 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                tracing::info!("Applying migration {}", version);
                let tx = conn.transaction()?;
                tx.execute_batch(migration)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version) VALUES (?1)",
                    [version],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    })
}
