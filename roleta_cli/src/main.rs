use std::str::FromStr;

use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use roleta_core::{
    layout, seed_fingerprint, EntropySource, ItemList, SeededSource, WheelSession, SETTLE_DURATION,
};

#[derive(Parser)]
#[command(name = "roleta-cli", about = "Admin CLI for the roleta wheel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Database URL, default sqlite://roleta.db
    #[arg(long, value_parser, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List items with weights and sector spans
    List,
    /// Add an item to the wheel
    Add {
        name: String,
        /// Weight, default 1.0
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Remove an item by name
    Remove { name: String },
    /// Change an item's weight
    SetWeight { name: String, weight: f64 },
    /// Spin the wheel and wait for it to settle
    Spin {
        /// Reproducible spin from a seed instead of system entropy
        #[arg(long)]
        seed: Option<String>,
    },
    /// View last N log entries
    ViewLogs {
        #[arg(default_value_t = 20)]
        n: i64,
    },
    /// Export spins to CSV path
    ExportCsv { path: String },
}

async fn get_pool(url: Option<String>) -> anyhow::Result<SqlitePool> {
    let url = url.unwrap_or_else(|| "sqlite://roleta.db".into());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(SqliteConnectOptions::from_str(&url)?.create_if_missing(true))
        .await?;
    Ok(pool)
}

// Same schema the server migrates; created here too so the CLI works against
// a fresh database.
async fn ensure_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS wheel (id INTEGER PRIMARY KEY CHECK (id = 1), items_json TEXT NOT NULL)",
    )
    .execute(pool)
    .await?;
    sqlx::query("INSERT INTO wheel (id, items_json) VALUES (1, '[]') ON CONFLICT(id) DO NOTHING")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS spins (id INTEGER PRIMARY KEY AUTOINCREMENT, ts TEXT NOT NULL, rotation REAL NOT NULL, selected TEXT NOT NULL)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn load_items(pool: &SqlitePool) -> anyhow::Result<ItemList> {
    let row = sqlx::query("SELECT items_json FROM wheel WHERE id = 1")
        .fetch_one(pool)
        .await?;
    let json: String = row.get("items_json");
    Ok(serde_json::from_str(&json)?)
}

async fn store_items(pool: &SqlitePool, items: &ItemList) -> anyhow::Result<()> {
    sqlx::query("UPDATE wheel SET items_json = ? WHERE id = 1")
        .bind(serde_json::to_string(items)?)
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let pool = get_pool(cli.database_url).await?;
    ensure_schema(&pool).await?;

    match cli.command {
        Commands::List => {
            let items = load_items(&pool).await?;
            if items.is_empty() {
                println!("The wheel has no items.");
            }
            for sector in layout(&items) {
                println!(
                    "{:<20} weight={:<8} {:>7.1}° .. {:>7.1}°",
                    sector.item.name, sector.item.weight, sector.start_deg, sector.end_deg
                );
            }
        }
        Commands::Add { name, weight } => {
            let mut items = load_items(&pool).await?;
            match weight {
                Some(weight) => items.add_weighted(&name, weight)?,
                None => items.add(&name)?,
            }
            store_items(&pool, &items).await?;
            println!("Added {}. The wheel now has {} items.", name.trim(), items.len());
        }
        Commands::Remove { name } => {
            let mut items = load_items(&pool).await?;
            let removed = items.remove(&name)?;
            store_items(&pool, &items).await?;
            println!("Removed {}.", removed.name);
        }
        Commands::SetWeight { name, weight } => {
            let mut items = load_items(&pool).await?;
            items.set_weight(&name, weight)?;
            store_items(&pool, &items).await?;
            println!("Set weight of {name} to {weight}.");
        }
        Commands::Spin { seed } => {
            let items = load_items(&pool).await?;
            if items.is_empty() {
                println!("Nothing to spin: the wheel has no items.");
                return Ok(());
            }
            let mut session = WheelSession::new();
            let target = match &seed {
                Some(seed) => {
                    println!("seed fingerprint: {}", seed_fingerprint(seed));
                    session.spin(&items, &mut SeededSource::new(seed))
                }
                None => session.spin(&items, &mut EntropySource::new()),
            }
            .ok_or_else(|| anyhow::anyhow!("spin did not start"))?;
            println!("Spinning to {target:.1}° ...");
            tokio::time::sleep(SETTLE_DURATION).await;
            let outcome = session
                .settle()
                .ok_or_else(|| anyhow::anyhow!("no pending spin"))?;
            sqlx::query("INSERT INTO spins (ts, rotation, selected) VALUES (?, ?, ?)")
                .bind(Utc::now().to_rfc3339())
                .bind(outcome.rotation)
                .bind(&outcome.selected.name)
                .execute(&pool)
                .await?;
            println!("Selected: {}", outcome.selected.name);
        }
        Commands::ViewLogs { n } => {
            let rows = sqlx::query(
                "SELECT id, ts, rotation, selected FROM spins ORDER BY id DESC LIMIT ?",
            )
            .bind(n)
            .fetch_all(&pool)
            .await?;
            for r in rows {
                let id: i64 = r.get("id");
                let ts: String = r.get("ts");
                let rotation: f64 = r.get("rotation");
                let selected: String = r.get("selected");
                println!("#{id:>6} {ts} rotation={rotation:.1} selected={selected}");
            }
        }
        Commands::ExportCsv { path } => {
            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record(["id", "ts", "rotation", "selected"])?;
            let rows = sqlx::query("SELECT id, ts, rotation, selected FROM spins ORDER BY id ASC")
                .fetch_all(&pool)
                .await?;
            let total = rows.len();
            for r in &rows {
                wtr.write_record(&[
                    r.get::<i64, _>("id").to_string(),
                    r.get::<String, _>("ts"),
                    r.get::<f64, _>("rotation").to_string(),
                    r.get::<String, _>("selected"),
                ])?;
            }
            wtr.flush()?;
            println!("Exported {total} rows to {path}");
        }
    }

    Ok(())
}
