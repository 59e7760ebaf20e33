mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;
mod server;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::{InsightServiceClient, OpenWeatherMapClient};
use db::Database;
use logic::{CropRulesEngine, CycleOutcome, ForecastService, RecommendationService};
use models::{ForecastSet, RecommendationRequest};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .init();

    if let Some(Commands::Init) = cli.command {
        Config::setup_interactive()?;
        return Ok(());
    }

    if !Config::exists(cli.config.as_ref()) {
        anyhow::bail!(
            "No config file found. Run `farmcast init` or copy config/config.yaml.example to config/config.yaml"
        );
    }
    let config = Config::load(cli.config.clone()).context("Configuration error")?;
    tracing::debug!(?config, "Loaded configuration");

    let db_path = Config::db_path(cli.data_dir.as_ref())?;
    let db = Database::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    let result = run(cli.command.unwrap_or(Commands::Serve), config, db.clone()).await;

    db.close()?;
    result
}

async fn run(command: Commands, config: Config, db: Database) -> anyhow::Result<()> {
    match command {
        Commands::Serve => {
            let forecasts = forecast_service(&config, db.clone())?;
            server::serve(server::AppState::new(config, db, forecasts)).await?;
        }
        Commands::Forecast { region } => {
            let forecasts = forecast_service(&config, db)?;
            print_cycle(forecasts.run_cycle(&region).await)?;
        }
        Commands::Recommend {
            soil_type,
            rainfall,
            temperature,
            farmer_id,
        } => {
            let mut request = RecommendationRequest::new(soil_type, rainfall, temperature);
            if let Some(id) = farmer_id {
                request = request.with_farmer(id);
            }
            let record = RecommendationService::new(db).recommend(&request)?;
            println!("Recommended crops: {}", record.recommended_crops.join(", "));
            println!("Recorded as {}", record.id);
        }
        Commands::History { region } => {
            let entries = db.forecast_history(region.as_deref())?;
            if entries.is_empty() {
                println!("No forecast snapshots stored");
            }
            for entry in entries {
                let set = ForecastSet::new(entry.region, entry.forecast);
                println!(
                    "#{} {} at {} ({} days, {:.1}mm total)",
                    entry.id,
                    set.region,
                    entry.captured_at.format("%Y-%m-%d %H:%M UTC"),
                    set.days.len(),
                    set.total_precipitation()
                );
            }
        }
        Commands::Check => check(&config, &db).await?,
        Commands::Init => {
            Config::setup_interactive()?;
        }
    }
    Ok(())
}

fn forecast_service(config: &Config, db: Database) -> anyhow::Result<ForecastService> {
    let timeout = config.request_timeout();
    let samples = OpenWeatherMapClient::new(config.openweathermap.clone(), timeout)?;
    let insights = InsightServiceClient::new(config.insights.clone(), timeout)?;
    Ok(ForecastService::new(
        &config.forecast,
        db,
        Arc::new(samples),
        Arc::new(insights),
    ))
}

fn print_cycle(outcome: CycleOutcome) -> anyhow::Result<()> {
    let (report, warning) = outcome.into_result()?;
    let set = ForecastSet::new(report.region.clone(), report.forecast);

    println!("Forecast for {}", set.region);
    if set.is_empty() {
        println!("  (no samples returned)");
    }
    for day in &set.days {
        println!(
            "  {:<10} {:>5.1}°C {:>6.1}mm {:>5.1}% soil moisture ({} samples)",
            day.day_label,
            day.mean_temperature,
            day.total_precipitation,
            day.soil_moisture_estimate,
            day.sample_count
        );
    }
    if let Some(id) = report.snapshot_id {
        println!("  Stored as snapshot #{}", id);
    }

    println!();
    if let Some(reason) = warning {
        println!("Warning: insights unavailable ({}), showing defaults", reason);
    }
    for item in &report.insights {
        println!("  {} {}: {}", item.category.symbol(), item.title, item.description);
    }
    Ok(())
}

async fn check(config: &Config, db: &Database) -> anyhow::Result<()> {
    config.validate()?;
    println!("Config OK");
    println!(
        "Database: {} (bucket key: {}, max days: {})",
        db.path().display(),
        config.forecast.bucket_key,
        config.forecast.max_days
    );

    let rules: Vec<&str> = CropRulesEngine::new()
        .list_rules()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    println!("Crop rules: {}", rules.join(", "));

    let timeout = config.request_timeout();
    let owm = OpenWeatherMapClient::new(config.openweathermap.clone(), timeout)?;
    match owm.test_connection(&config.forecast.default_region).await {
        Ok(true) => println!("OpenWeatherMap: OK"),
        Ok(false) => println!("OpenWeatherMap: rejected request (check API key)"),
        Err(e) => println!("OpenWeatherMap: OFFLINE ({})", e),
    }

    let insights = InsightServiceClient::new(config.insights.clone(), timeout)?;
    match insights.test_connection().await {
        Ok(true) => println!("Insight service: OK"),
        Ok(false) => println!("Insight service: error response"),
        Err(e) => println!("Insight service: OFFLINE ({})", e),
    }

    Ok(())
}
