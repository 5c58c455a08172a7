use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use seqcraft_audit::config::AuditConfig;
use seqcraft_db::{DbConfig, PgStore};

/// Exit status when at least one sequence is structurally invalid.
const EXIT_INVALID: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "seqcraft_audit=info".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    // --- Configuration ---
    let db_config = DbConfig::from_env().context("invalid database configuration")?;
    let config = AuditConfig::from_env().context("invalid audit configuration")?;
    tracing::info!(owner_id = ?config.owner_id, "Loaded audit configuration");

    // --- Database ---
    let pool = seqcraft_db::create_pool(&db_config)
        .await
        .context("failed to connect to database")?;
    seqcraft_db::health_check(&pool)
        .await
        .context("database health check failed")?;
    if config.run_migrations {
        seqcraft_db::run_migrations(&pool)
            .await
            .context("failed to run database migrations")?;
        tracing::info!("Database migrations applied");
    }

    // --- Audit ---
    let store = PgStore::new(pool);
    let summary = seqcraft_audit::audit(&store, config.owner_id)
        .await
        .context("audit failed")?;

    for report in summary.invalid() {
        tracing::warn!(
            sequence_id = report.sequence_id,
            title = %report.title,
            errors = ?report.errors,
            "Sequence is structurally invalid"
        );
    }
    tracing::info!(
        total = summary.total(),
        invalid = summary.invalid_count(),
        "Audit finished"
    );

    if config.report_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if config.fail_on_invalid && summary.invalid_count() > 0 {
        return Ok(ExitCode::from(EXIT_INVALID));
    }
    Ok(ExitCode::SUCCESS)
}
