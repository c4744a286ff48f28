//! Retail sales CLI - clean, enrich and summarise store sales CSV files
//!
//! # Commands
//!
//! ```bash
//! retail-sales analyze                  # Analyse retail_sales.csv, write 3 CSV files
//! retail-sales analyze data.csv -o out  # Analyse data.csv, write into out/
//! retail-sales parse data.csv           # Just parse CSV to JSON
//! retail-sales serve                    # Start HTTP server (port 3000)
//! retail-sales farm                     # Farm revenue estimate
//! ```

use clap::{Parser, Subcommand};
use retail_sales::{
    analyze_parsed, export_report,
    export::{cleaned_header, cleaned_row, format_number},
    farm::{default_report, format_rupees},
    format_delimiter, parse_csv_file, parse_csv_file_auto, rows_above, rows_for_store,
    transform::highlights::{STRONG_DAY_THRESHOLD, STRONG_WEEKEND_THRESHOLD},
    weekend_rows_above, JobLogger, RawTable, SalesRecord, SalesReport, Settings, StoreId,
    StoreTotal,
};
use std::fs;
use std::path::{Path, PathBuf};

use retail_sales::config::{DEFAULT_HIGHLIGHT_STORE, DEFAULT_INPUT_FILE};

/// Rows shown in each preview table.
const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "retail-sales")]
#[command(about = "Clean, enrich and summarise retail sales CSV files", long_about = None)]
struct Cli {
    /// Show pipeline logs (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: clean, derive, aggregate and export
    Analyze {
        /// Input CSV file
        #[arg(default_value = DEFAULT_INPUT_FILE)]
        input: PathBuf,

        /// Directory for the output CSV files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Store shown in the per-store highlight
        #[arg(short, long, default_value = DEFAULT_HIGHLIGHT_STORE)]
        store: String,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: RETAIL_SALES_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the farm revenue estimate
    Farm,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            store,
        } => cmd_analyze(&input, &output_dir, &store),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Serve { port } => cmd_serve(port).await,

        Commands::Farm => cmd_farm(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbose: u8) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("retail_sales={},tower_http=warn", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn cmd_analyze(
    input: &Path,
    output_dir: &Path,
    store: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let log = JobLogger::default();
    let parsed = parse_csv_file_auto(input)?;
    eprintln!("   Encoding: {}", parsed.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(parsed.delimiter));

    let raw = parsed.table.clone();
    print_raw_preview(&raw);

    let outcome = analyze_parsed(parsed, &log)?;
    let report = &outcome.report;

    println!("\nMissing values before cleaning:");
    print_counts(&report.cleaning.missing_before);
    if report.cleaning.duplicates_removed > 0 {
        println!("\nDuplicates removed: {}", report.cleaning.duplicates_removed);
    }
    println!("\nMissing values after cleaning:");
    print_counts(&report.cleaning.missing_after);

    if !report.cleaning.issues.is_empty() {
        eprintln!("\n⚠️  {} row issue(s):", report.cleaning.issues.len());
        for issue in report.cleaning.issues.iter().take(PREVIEW_ROWS) {
            eprintln!("   - {}", issue);
        }
    }

    print_highlights(report, store);

    println!("\nTotal sales by Store:");
    print_store_totals(&report.store_totals);

    println!("\nAverage daily sales by Month:");
    print_table(
        &["Month", "AvgDailySales"],
        report
            .month_averages
            .iter()
            .map(|m| vec![m.month.to_string(), format_number(m.avg_daily_sales)]),
    );

    println!("\nAverage sales by Weekday:");
    print_table(
        &["Weekday", "AvgSalesPerDay"],
        report
            .weekday_averages
            .iter()
            .map(|w| vec![w.weekday.clone(), format_number(w.avg_sales_per_day)]),
    );

    println!("\nTop {} Stores by Total Sales:", report.top_stores.len());
    print_store_totals(&report.top_stores);

    println!("\nData with Derived Columns:");
    print_records(report, report.records.iter().take(PREVIEW_ROWS));

    let files = export_report(report, output_dir, &log)?;
    eprintln!("\n✅ Exported:");
    for path in files.paths() {
        eprintln!("   💾 {}", path.display());
    }

    Ok(())
}

fn print_raw_preview(raw: &RawTable) {
    println!("\nFirst {} rows of dataset:", PREVIEW_ROWS.min(raw.records.len()));
    let headers: Vec<&str> = raw.headers.iter().map(String::as_str).collect();
    print_table(
        &headers,
        raw.records
            .iter()
            .take(PREVIEW_ROWS)
            .map(|r| r.fields.clone()),
    );

    let (rows, cols) = raw.shape();
    println!("\nShape (rows, columns): ({}, {})", rows, cols);
}

fn print_highlights(report: &SalesReport, store: &str) {
    let store_id = StoreId::from(store);

    println!("\nSales for StoreID {}:", store_id);
    print_records(
        report,
        rows_for_store(&report.records, &store_id)
            .into_iter()
            .take(PREVIEW_ROWS),
    );

    println!("\nDays with Sales > {}:", format_number(STRONG_DAY_THRESHOLD));
    print_records(
        report,
        rows_above(&report.records, STRONG_DAY_THRESHOLD)
            .into_iter()
            .take(PREVIEW_ROWS),
    );

    println!("\nWeekends with Sales > {}:", format_number(STRONG_WEEKEND_THRESHOLD));
    print_records(
        report,
        weekend_rows_above(&report.records, STRONG_WEEKEND_THRESHOLD)
            .into_iter()
            .take(PREVIEW_ROWS),
    );
}

fn print_records<'a>(report: &SalesReport, records: impl Iterator<Item = &'a SalesRecord>) {
    let header = cleaned_header(report);
    let headers: Vec<&str> = header.iter().map(String::as_str).collect();
    print_table(&headers, records.map(|r| cleaned_row(report, r)));
}

fn print_store_totals(totals: &[StoreTotal]) {
    print_table(
        &["StoreID", "TotalSales"],
        totals
            .iter()
            .map(|t| vec![t.store_id.to_string(), format_number(t.total_sales)]),
    );
}

fn print_counts(counts: &[(String, usize)]) {
    let width = counts.iter().map(|(c, _)| c.len()).max().unwrap_or(0);
    for (column, count) in counts {
        println!("  {:<width$}  {}", column, count, width = width);
    }
}

/// Print rows as left-aligned columns.
fn print_table(headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) {
    let rows: Vec<Vec<String>> = rows.into_iter().collect();
    if rows.is_empty() {
        println!("  (no rows)");
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect();
        println!("  {}", padded.join("  ").trim_end());
    };

    line(headers.to_vec());
    for row in &rows {
        line(row.iter().map(String::as_str).collect());
    }
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = match delimiter {
        Some(d) => parse_csv_file(input, d)?,
        None => parse_csv_file_auto(input)?,
    };

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.table.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.table.records.len());

    let json = serde_json::to_string_pretty(&result.to_json())?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env().with_port(port);
    retail_sales::server::start_server(settings).await
}

fn cmd_farm() -> Result<(), Box<dyn std::error::Error>> {
    let report = default_report();

    eprintln!(
        "🌾 {} acres in segments of {} acres",
        retail_sales::farm::TOTAL_ACRES,
        report.segment_acres
    );
    for crop in &report.crops {
        eprintln!(
            "   {:<10} {:>8.1} t  {}{}",
            crop.name,
            crop.tonnes,
            format_rupees(crop.revenue),
            if crop.chemical_free { "" } else { "  (not chemical-free)" }
        );
    }

    println!(
        "a. Total sales from all {} acres: {}",
        retail_sales::farm::TOTAL_ACRES,
        format_rupees(report.total_sales)
    );
    println!(
        "b. Sales from chemical-free farming after 11 months: {}",
        format_rupees(report.chemical_free_sales)
    );
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
