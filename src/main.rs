#![forbid(unsafe_code)]
//! # Keyword Analysis CLI
//!
//! Command-line front end for the `keyword_analysis` crate: point it at a
//! folder of `.pdf`/`.docx`/`.pptx` documents, give it a keyword list, and it
//! prints a per-category report, writes the CSV artifact, and optionally
//! dumps chart-ready series as JSON.
//!
//! ## Example
//! ```bash
//! keyword_analysis notes/ --keywords algebra,calculus --out exports/
//! ```
//!
//! See `--help` for all available options.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;
use log::error;

use keyword_analysis::{
    AnalysisReport, Insight, chart_data, collect_files, print_failed_files, run_analysis, save_csv,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Folder (or single file) to analyze
    path: String,

    /// Comma-separated keyword list; entry order drives display and exports
    #[arg(short, long, value_delimiter = ',', required = true)]
    keywords: Vec<String>,

    /// Directory for the timestamped CSV artifact
    #[arg(long, default_value = ".")]
    out: String,

    /// Also write the chart-ready series as JSON to this path
    #[arg(long)]
    charts_json: Option<String>,

    /// Include context snippets in the report
    #[arg(long, default_value_t = false)]
    contexts: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let files = collect_files(Path::new(&cli.path));
    let report = match run_analysis(files, &cli.keywords) {
        Ok(report) => report,
        Err(e) => {
            error!("Error: {}", e);
            process::exit(1);
        }
    };

    println!("{}", render_report(&report, cli.contexts));

    match save_csv(&report.result, &report.keywords, Path::new(&cli.out)) {
        Ok(path) => println!("CSV written to {}", path.display()),
        Err(e) => {
            error!("Error writing CSV: {}", e);
            process::exit(1);
        }
    }

    if let Some(charts_path) = &cli.charts_json {
        let charts = chart_data(&report.result, &report.keywords);
        let json = match serde_json::to_string_pretty(&charts) {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing chart data: {}", e);
                process::exit(1);
            }
        };
        if let Err(e) = fs::write(charts_path, json) {
            error!("Error writing chart data: {}", e);
            process::exit(1);
        }
        println!("Chart data written to {charts_path}");
    }

    // Per-file extraction failures are diagnostics, not a run failure.
    if !report.failed_files.is_empty() {
        print_failed_files(&report.failed_files);
    }
}

fn render_report(report: &AnalysisReport, with_contexts: bool) -> String {
    let mut out = String::new();

    for (category, aggregate) in report.result.categories() {
        let _ = writeln!(out, "== {} ({} files) ==", category, aggregate.file_count());
        for keyword in &report.keywords {
            let total = aggregate.keyword_total(keyword);
            if total == 0 {
                continue;
            }
            let _ = writeln!(out, "  {keyword}: {total}");
            for detail in aggregate.sorted_details(keyword) {
                let _ = writeln!(out, "    {} ({})", detail.file_name, detail.count);
                if with_contexts {
                    for context in &detail.contexts {
                        let _ = writeln!(out, "      {context}");
                    }
                }
            }
        }
    }

    match &report.insight {
        Insight::NoMatches => {
            let _ = writeln!(out, "No keyword was found in any document.");
        }
        Insight::Findings(findings) => {
            let _ = writeln!(
                out,
                "Most frequent keyword: \"{}\" ({} occurrences)",
                findings.most_frequent.keyword, findings.most_frequent.total
            );
            let _ = writeln!(
                out,
                "Most shared keyword: \"{}\" (present in {} of {} categories)",
                findings.most_shared.keyword,
                findings.most_shared.category_count,
                findings.most_shared.category_total
            );
            for d in &findings.distinctive {
                let _ = writeln!(
                    out,
                    "Distinctive for {}: \"{}\" ({}% of its occurrences)",
                    d.category,
                    d.keyword,
                    (d.ratio * 100.0).round()
                );
            }
        }
    }

    out
}
