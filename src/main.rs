mod error;
mod output;
mod parser;
mod scanner;
mod settings;
mod wiki;

use std::time::Instant;

use clap::Parser;

use settings::Settings;
use wiki::MediaWikiClient;

#[derive(Parser)]
#[command(
    name = "wiki_deaths",
    about = "Extract birth/death dates from Wikipedia \"<year> deaths\" categories"
)]
struct Cli {
    /// Death years to scan, e.g. 2020 2019
    #[arg(required = true)]
    years: Vec<u16>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;
    let client = MediaWikiClient::new(&settings)?;

    for year in cli.years {
        println!("*** {} DEATHS ***", year);
        let category = format!("{}{} deaths", settings.category_prefix, year);

        let t_scan = Instant::now();
        let outcome = scanner::scan(&client, &category, settings.limit)?;
        println!(
            "Num successful: {} failed: {}",
            outcome.summary.succeeded, outcome.summary.failed
        );
        println!("Scanned {} in {}", category, format_duration(t_scan.elapsed()));

        let path = settings.output_dir.join(format!("deaths{}.csv", year));
        output::write_csv(&path, &outcome.rows)?;
        println!("Wrote {} rows to {}", outcome.rows.len(), path.display());
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
