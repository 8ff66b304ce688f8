use anyhow::Context;
use chrono::Local;
use tracing::{error, info};

use sales_insights_seeder::config::{init_tracing, load_config};
use sales_insights_seeder::db::{
    check_connection, close_pool, establish_connection, establish_connection_from_app_config,
};
use sales_insights_seeder::schema::ensure_schema;
use sales_insights_seeder::Pipeline;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(error = %err, "Seeding run failed");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = load_config().context("failed to load configuration")?;
    init_tracing(&cfg.log_level, cfg.log_json);

    info!(
        start = %cfg.start_date,
        end = %cfg.end_date,
        seed = ?cfg.random_seed,
        "Starting sales insights seeding run"
    );

    let db = establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to destination database")?;
    check_connection(&db)
        .await
        .context("destination database is not reachable")?;

    if cfg.auto_migrate {
        ensure_schema(&db)
            .await
            .context("failed to create destination tables")?;
    }

    let source_url = cfg.source_database_url.clone();
    let today = Local::now().date_naive();
    let mut pipeline = Pipeline::new(db.clone(), cfg, today);

    match source_url {
        Some(url) => {
            let source = establish_connection(&url)
                .await
                .context("failed to connect to source database")?;
            check_connection(&source)
                .await
                .context("source database is not reachable")?;
            pipeline
                .extract_and_load(&source)
                .await
                .context("master data extraction failed")?;
            close_pool(source).await?;
        }
        None => info!("No source database configured; using existing master data"),
    }

    let summary = pipeline.run().await.context("generation run failed")?;

    info!(
        orders = summary.orders,
        quotations = summary.quotations,
        targets = summary.targets,
        inventory_snapshots = summary.inventory_snapshots,
        forecasts = summary.forecasts,
        total = summary.total(),
        "Seeding run complete"
    );

    close_pool(db).await?;
    Ok(())
}
