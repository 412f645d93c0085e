use clap::Parser;
use rera_scrape::MAX_ITEMS;
use rera_scrape::export::DEFAULT_EXPORT_FILE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rera-scrape")]
#[command(about = "Scrapes project and promoter details from rera.odisha.gov.in")]
#[command(version)]
pub struct Args {
    /// Number of projects to retrieve
    #[arg(short, long, default_value_t = 6, value_parser = parse_limit)]
    pub limit: usize,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to write the CSV export
    #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
    pub output: PathBuf,

    /// Skip writing the CSV export
    #[arg(long)]
    pub no_export: bool,

    /// WebDriver server URL (overrides config and WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Print records as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Accept only item counts in `1..=MAX_ITEMS`
fn parse_limit(s: &str) -> Result<usize, String> {
    let limit: usize = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (1..=MAX_ITEMS).contains(&limit) {
        Ok(limit)
    } else {
        Err(format!("limit must be between 1 and {MAX_ITEMS}"))
    }
}
