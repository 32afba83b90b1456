// Gridiron entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config, seeding config/ from defaults/ on first run
// 3. Load the player pool
// 4. Build, rank and simulate the lineup batch
// 5. Print the summary and export CSV/JSON

mod report;

use std::path::Path;

use anyhow::Context;
use gridiron_core::config;
use gridiron_core::pool;
use gridiron_core::run;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Gridiron starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let rules = config
        .active_contest()
        .context("failed to resolve contest profile")?;
    info!(
        "Config loaded: contest={} ({} entries), ${} salary cap, {} lineups requested",
        rules.name, rules.entries, config.strategy.roster.salary_cap, config.run.num_lineups
    );

    // 3. Load the player pool
    let pool_path = Path::new(&config.data_paths.player_pool);
    let pool = pool::load_pool(pool_path, &config.strategy.variance)
        .with_context(|| format!("failed to load player pool from {}", pool_path.display()))?;

    // 4. Build, rank and simulate
    let report = run::run(&config, &pool).context("lineup run failed")?;

    // 5. Summary and export
    report::print_summary(&report);
    let export_dir = Path::new(&config.data_paths.export_dir);
    let written = report::export(&report, export_dir).context("failed to export lineups")?;
    println!();
    println!("Lineups written to {}", written.csv.display());
    println!("Summary written to {}", written.json.display());

    info!("Gridiron finished");
    Ok(())
}

/// Initialize tracing to log to a file, keeping the terminal for results.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("gridiron.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gridiron=info,gridiron_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
