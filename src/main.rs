use clap::Parser;
use rera_scrape::ScraperConfig;
use rera_scrape::export;
use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Note: scraping requires a WebDriver server (e.g., ChromeDriver).");
    println!("Using WebDriver at {}", config.webdriver_url);

    let start_time = std::time::Instant::now();
    ::log::info!("Fetching up to {} projects from {}", args.limit, config.listing_url);

    let report = rera_scrape::fetch_records_with_progress(&config, args.limit, |item, total| {
        eprintln!("{}", progress_line(item, total));
    })
    .await;

    ::log::info!(
        "Run finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }

    if report.records.is_empty() {
        match &report.failure {
            Some(e) => eprintln!("error: {}", e),
            None => eprintln!("No records found."),
        }
        return ExitCode::FAILURE;
    }

    if args.json {
        match serde_json::to_string_pretty(&report.records) {
            Ok(json) => println!("{}", json),
            Err(e) => ::log::error!("Failed to serialize records: {}", e),
        }
    } else {
        print!("{}", export::render_table(&report.records));
    }
    println!(
        "{} project entries collected successfully.",
        report.records.len()
    );

    if let Some(e) = &report.failure {
        eprintln!("error: run stopped early: {}", e);
    }

    if !args.no_export {
        let written = File::create(&args.output)
            .and_then(|file| export::write_csv(BufWriter::new(file), &report.records));
        match written {
            Ok(()) => println!("CSV written to {}", args.output.display()),
            Err(e) => {
                ::log::error!("Failed to write {}: {}", args.output.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn progress_line(item: usize, total: usize) -> String {
    format!("[{}/{}] Fetching project details...", item, total)
}

/// Config file (if any), then WEBDRIVER_URL, then command-line flags
fn load_config(args: &Args) -> Result<ScraperConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => ScraperConfig::from_file(path)?,
        None => ScraperConfig::default(),
    }
    .with_env_overrides();

    if let Some(url) = &args.webdriver_url {
        config.webdriver_url = url.clone();
    }
    if args.headless {
        config.headless = true;
    }

    config.validate()?;
    Ok(config)
}
