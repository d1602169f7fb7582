//! hydrostat - Summarize water-intake logs into daily, weekly, and monthly totals

use chrono::Utc;
use clap::Parser;
use hydrostat::{
    aggregation::Aggregator,
    cli::{Cli, Command},
    data_loader::DataLoader,
    error::Result,
    output::get_formatter,
    report::{ReportOptions, build_comparison_report, build_intake_report},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays machine-readable
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hydrostat=info"))
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = cli.command();
    let granularity = command.granularity();

    let tz_config = cli.timezone_config()?;
    info!("Using timezone: {}", tz_config.display_name());

    let max_buckets = cli.max_buckets(granularity);
    let window = cli.window(granularity, Utc::now(), &tz_config.tz)?;
    info!("Aggregating {} .. {}", window.start, window.end);

    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let loaded = DataLoader::from_arg(&cli.input, tz_config.tz)
        .with_progress(show_progress)
        .load()
        .await?;
    info!(
        "Loaded {} records ({} skipped)",
        loaded.records.len(),
        loaded.skipped
    );

    let formatter = get_formatter(cli.json);

    match command {
        Command::Compare(_) => {
            info!("Running {} comparison", granularity);
            let report = build_comparison_report(
                &tz_config,
                window,
                max_buckets,
                &loaded.records,
                granularity,
            )?;
            println!("{}", formatter.format_comparison(&report));
        }
        Command::Daily | Command::Weekly | Command::Monthly => {
            info!("Running {} intake report", granularity);
            let aggregator = Aggregator::new(tz_config)
                .with_window(window)
                .with_max_buckets(max_buckets);
            let options = ReportOptions {
                goal: cli.goal,
                placeholder: cli.placeholder,
            };
            let report = build_intake_report(&aggregator, &loaded.records, granularity, options)?;
            println!("{}", formatter.format_report(&report));
        }
    }

    Ok(())
}
