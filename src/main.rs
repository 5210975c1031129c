// =============================================================================
// TradeVision Core - Main Entry Point
// =============================================================================
//
// Loads a historical OHLC series from CSV, classifies the trailing regime,
// then extends the series with synthetic forward bars and writes the result
// to an output CSV.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod error;
mod market_data;
mod regime;
mod render;
mod runtime_config;
mod session;
mod simulator;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::render::CsvChartWriter;
use crate::runtime_config::RuntimeConfig;
use crate::session::SimulationSession;

fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        TradeVision Core — Starting Up                   ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = RuntimeConfig::load("runtime_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Env overrides, then the command line; a path on argv wins over both.
    if let Ok(path) = std::env::var("TRADEVISION_HISTORY") {
        config.history_path = Some(path);
    }
    if let Ok(steps) = std::env::var("TRADEVISION_STEPS") {
        match steps.parse::<u32>() {
            Ok(n) => config.forward_steps = n,
            Err(_) => warn!(value = %steps, "Ignoring unparseable TRADEVISION_STEPS"),
        }
    }
    if let Ok(seed) = std::env::var("TRADEVISION_SEED") {
        match seed.parse::<u64>() {
            Ok(s) => config.sim_seed = Some(s),
            Err(_) => warn!(value = %seed, "Ignoring unparseable TRADEVISION_SEED"),
        }
    }
    if let Some(path) = std::env::args().nth(1) {
        config.history_path = Some(path);
    }

    let history_path = config.history_path.clone().ok_or_else(|| {
        anyhow::anyhow!("no history CSV configured (config file, TRADEVISION_HISTORY, or argv[1])")
    })?;

    // ── 2. Load & classify ───────────────────────────────────────────────
    info!(path = %history_path, "Parsing data");
    let series = market_data::load_history(&history_path)?;
    if series.is_empty() {
        anyhow::bail!("history CSV {history_path} contained no usable bars");
    }
    info!(bars = series.len(), "Loaded bars. Ready.");

    let mut session = match config.sim_seed {
        Some(seed) => {
            info!(seed, "Seeded simulation run");
            SimulationSession::from_seed(seed)
        }
        None => SimulationSession::new(),
    };
    session.on_history_loaded(series);

    match session.regime() {
        Some(est) => info!(
            label = %est.label,
            volatility = format!("{:.6}", est.volatility),
            change = format!("{:+.4}", est.change),
            "Current regime"
        ),
        None => info!(min_bars = regime::REGIME_WINDOW, "Regime unavailable"),
    }

    // ── 3. Extend the series ─────────────────────────────────────────────
    let mut chart = CsvChartWriter::create(&config.output_path)?;
    chart.write_history(session.history().bars())?;

    for _ in 0..config.forward_steps {
        let bar = session.on_advance_requested()?;
        chart.append_bar(&bar)?;
        info!(
            time = bar.time,
            open = format!("{:.4}", bar.open),
            close = format!("{:.4}", bar.close),
            "Simulated bar"
        );
    }
    chart.finish()?;

    if let Some(last) = session.last_bar() {
        info!(
            time = last.time,
            close = format!("{:.4}", last.close),
            "Final simulated bar"
        );
    }
    info!(
        steps = config.forward_steps,
        output = %config.output_path,
        "Simulation complete"
    );
    Ok(())
}
