//! Ensure the remote hydraulic store schema exists, then report what changed.

use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use hydraulic_store::domain::SchemaMigrator;
use hydraulic_store::outbound::gateway::GatewayHttpExecutor;
use hydraulic_store::settings::GatewaySettings;

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = GatewaySettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load gateway settings")?;
    let config = settings
        .into_config()
        .wrap_err("invalid gateway settings")?;
    let executor = Arc::new(
        GatewayHttpExecutor::new(config).wrap_err("failed to build gateway executor")?,
    );

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    let report = runtime
        .block_on(SchemaMigrator::new(executor).ensure_schema())
        .wrap_err("schema setup failed")?;

    if report.added_columns.is_empty() {
        println!("schema ready: {} tables ensured", report.tables_ensured);
    } else {
        println!(
            "schema ready: {} tables ensured, added {}",
            report.tables_ensured,
            report.added_columns.join(", ")
        );
    }
    Ok(())
}
