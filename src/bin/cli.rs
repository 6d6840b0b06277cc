use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::*;
use structopt::StructOpt;
use template_advisor::{
    core::config::AppConfig, GenerateResponse, ProgressTracker, TemplateService,
};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "advisor-cli",
    about = "Generate a research template from a company's latest 10-K or 10-Q"
)]
struct Opt {
    /// Ticker symbol, e.g. AAPL
    ticker: String,

    /// Print a readable summary instead of JSON
    #[structopt(short, long)]
    summary: bool,

    /// Pretty-print the JSON output
    #[structopt(short, long)]
    pretty: bool,

    /// Reference date for year labels (YYYY-MM-DD), defaults to today
    #[structopt(long)]
    as_of: Option<NaiveDate>,

    /// Hide the progress spinner
    #[structopt(short, long)]
    quiet: bool,
}

fn print_summary(response: &GenerateResponse) {
    let data = &response.template_data;
    let analysis = &data.structured_data;

    println!(
        "\n{} ({})",
        response.company_name.bold(),
        response.ticker.cyan()
    );
    for filing in [&response.filings_summary.ten_k, &response.filings_summary.ten_q] {
        if filing != "N/A" {
            println!("{}", filing.dimmed());
        }
    }
    println!("\n{} {}", "Sector:".bold(), data.basic_info.sector);
    println!("{} {}", "Business:".bold(), data.business_model);

    println!("\n{}", "Income statement".bold());
    for row in &analysis.income_statement {
        println!(
            "  {}  revenue {:>10}  ({:+.1}%)  net income {:>10}  {}",
            row.year,
            row.total_revenue,
            row.total_revenue_yoy_growth,
            row.net_income,
            row.revenue_vs_net_income_comparison.dimmed()
        );
    }

    let metrics = &analysis.financial_metrics;
    println!(
        "\n{} {:.1}% ({})   {} {:.2} ({})",
        "Debt to assets:".bold(),
        metrics.debt_to_assets_ratio,
        metrics.debt_to_assets_band,
        "Current ratio:".bold(),
        metrics.current_ratio,
        metrics.current_ratio_band
    );

    println!("\n{} {}", "CEO:".bold(), data.ceo_name);
    let lists = [
        ("Strengths", &analysis.summary.strengths, "green"),
        ("Weaknesses", &analysis.summary.weaknesses, "yellow"),
        ("Risks", &analysis.summary.risks, "red"),
    ];
    for (title, items, color) in lists {
        println!("\n{}", title.color(color).bold());
        if items.is_empty() {
            println!("  {}", "N/A".dimmed());
        }
        for item in items {
            println!("  - {}", item);
        }
    }
    println!("\n{} {}", "Verdict:".bold(), analysis.summary.final_verdict);

    if !analysis.degraded_stages.is_empty() {
        println!("\n{}", "Degraded stages".yellow().bold());
        for stage in &analysis.degraded_stages {
            println!("  {}: {}", stage.stage.yellow(), stage.reason);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    let opt = Opt::from_args();

    let config = AppConfig::from_env()?;
    let credentials = config.credentials()?;
    let service = TemplateService::from_config(&config, &credentials)?;

    let progress = ProgressTracker::new(!opt.quiet, &opt.ticker.to_uppercase());
    progress.update_message("Analyzing latest filing...");

    let result = match opt.as_of {
        Some(as_of) => service.generate_as_of(&opt.ticker, as_of).await,
        None => service.generate(&opt.ticker).await,
    };
    let response = match result {
        Ok(response) => {
            progress.finish("Done");
            response
        }
        Err(e) => {
            progress.abandon();
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(details) = e.details() {
                eprintln!("{}", details.dimmed());
            }
            std::process::exit(1);
        }
    };

    if opt.summary {
        print_summary(&response);
    } else {
        let json = if opt.pretty {
            serde_json::to_string_pretty(&response)
        } else {
            serde_json::to_string(&response)
        }
        .context("Failed to serialize response")?;
        println!("{}", json);
    }
    Ok(())
}
