mod bootstrap;

use anyhow::Result;
use sales_core::error::SalesError;
use sales_core::models::RegionFilter;
use sales_core::settings::Settings;
use sales_data::artifact::load_dataset;
use sales_data::metrics::{compute_summary, format_summary, region_totals};
use sales_data::pipeline::{self, PipelineConfig};
use sales_ui::app::{self, App};

/// Rows of the canonical output echoed after `process`.
const PREVIEW_ROWS: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    settings.validate()?;

    let app_dir = bootstrap::ensure_directories()?;

    // The TUI owns stderr while it runs, so its logs go to a file.
    let log_file = settings.log_file.clone().or_else(|| {
        matches!(settings.mode.as_str(), "dashboard" | "all")
            .then(|| bootstrap::default_log_file(&app_dir))
    });
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Sales Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Mode: {}, Product: {}, Cutoff: {}, Region: {}",
        settings.mode,
        settings.product,
        settings.cutoff,
        settings.region
    );

    let region = settings.region_filter()?;

    match settings.mode.as_str() {
        "process" => run_process(&settings)?,
        "summary" => run_summary(&settings)?,
        "dashboard" => run_dashboard(&settings, region).await?,
        "all" => {
            run_process(&settings)?;
            run_dashboard(&settings, region).await?;
        }
        other => anyhow::bail!("Unknown mode: {other}"),
    }

    Ok(())
}

fn run_process(settings: &Settings) -> Result<()> {
    let config = PipelineConfig::new(&settings.data_dir, &settings.output)
        .with_product(&settings.product);

    let output = pipeline::process(&config).map_err(SalesError::from)?;
    println!("{}", pipeline::format_report(&output, PREVIEW_ROWS));
    Ok(())
}

fn run_summary(settings: &Settings) -> Result<()> {
    let dataset = match load_dataset(&settings.output) {
        Ok(dataset) => dataset,
        Err(e) if e.is_not_found() => {
            println!(
                "No sales data at {}. Run with --mode process first.",
                settings.output.display()
            );
            return Ok(());
        }
        Err(e) => return Err(SalesError::from(e).into()),
    };

    let metrics = compute_summary(&dataset, settings.cutoff);
    println!("{}", format_summary(&metrics, &region_totals(&dataset)));
    Ok(())
}

async fn run_dashboard(settings: &Settings, region: RegionFilter) -> Result<()> {
    let loaded = load_dataset(&settings.output);
    if let Err(e) = &loaded {
        tracing::warn!("Dashboard starting without data: {e}");
    }

    let app = App::from_load_result(
        &settings.theme,
        settings.cutoff,
        region,
        &settings.output,
        loaded,
    );

    // Raw mode turns Ctrl+C into a key event, so the OS signal only arrives
    // from outside (e.g. `kill -INT`). Restore the terminal either way.
    tokio::select! {
        result = app.run() => {
            result.map_err(|e| SalesError::Terminal(e.to_string()))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down dashboard");
            app::restore_terminal()?;
        }
    }

    Ok(())
}
