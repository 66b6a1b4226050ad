//! Flat renderings of one analysis run: the CSV artifact and the
//! chart-ready series handed to the visualization collaborator. Both read
//! the same [`AnalysisResult`] independently and share no state.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;

use crate::aggregate::AnalysisResult;

/// UTF-8 byte-order mark expected by spreadsheet tools opening the CSV.
const BOM: &str = "\u{FEFF}";

const DETAIL_HEADER: [&str; 4] = [
    "Categoria",
    "Palabra Clave",
    "Total Apariciones",
    "Archivos con la Palabra (cantidad)",
];

const SUMMARY_MARKER: &str = "--- RESUMEN POR MATERIA ---";

const SUMMARY_HEADER: [&str; 4] = [
    "Materia",
    "Archivos Analizados",
    "Total Palabras Clave Encontradas",
    "Palabra Más Frecuente (Apariciones)",
];

/// Renders the two-block CSV artifact: per-(category, keyword) detail rows,
/// then a per-category summary block, separated by blank rows and a marker.
pub fn csv_bytes(result: &AnalysisResult, keyword_order: &[String]) -> csv::Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(BOM.as_bytes());

    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(&mut out);

    wtr.write_record(DETAIL_HEADER)?;
    for (category, aggregate) in result.categories() {
        for keyword in keyword_order {
            let total = aggregate.keyword_total(keyword);
            if total == 0 {
                continue;
            }
            let files: Vec<String> = aggregate
                .sorted_details(keyword)
                .iter()
                .map(|d| format!("{} ({})", d.file_name, d.count))
                .collect();
            let total = total.to_string();
            let files = files.join("; ");
            wtr.write_record([category, keyword.as_str(), &total, &files])?;
        }
    }

    // Two blank rows between the blocks, as the artifact consumers expect.
    wtr.write_record(None::<&[u8]>)?;
    wtr.write_record(None::<&[u8]>)?;
    wtr.write_record([SUMMARY_MARKER])?;
    wtr.write_record(SUMMARY_HEADER)?;
    for (category, aggregate) in result.categories() {
        let top = match aggregate.top_keyword(keyword_order) {
            Some((keyword, count)) => format!("{keyword} ({count})"),
            None => "N/A".to_string(),
        };
        let file_count = aggregate.file_count().to_string();
        let total_found = aggregate.total_found().to_string();
        wtr.write_record([category, &file_count, &total_found, &top])?;
    }

    wtr.flush()?;
    drop(wtr);
    Ok(out)
}

/// Writes the CSV artifact into `dir` under a timestamped name and returns
/// the full path.
pub fn save_csv(
    result: &AnalysisResult,
    keyword_order: &[String],
    dir: &Path,
) -> io::Result<PathBuf> {
    let bytes = csv_bytes(result, keyword_order).map_err(io::Error::other)?;

    let local: DateTime<Local> = Local::now();
    let file_name = local
        .format("%Y_%m_%d_%H_%M_%S_keyword_analysis.csv")
        .to_string();
    let path = dir.join(file_name);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;
    file.write_all(&bytes)?;
    Ok(path)
}

/// Chart-ready series for the rendering collaborator. `labels` is the subset
/// of the keyword list found anywhere, every `data` array is aligned to it.
#[derive(Debug, Serialize, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub total_counts: Vec<u64>,
    /// One series per category for grouped/radar comparison.
    pub category_series: Vec<CategorySeries>,
    /// Per-category nonzero subset for proportional (pie) views.
    pub category_breakdowns: Vec<CategoryBreakdown>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategorySeries {
    pub category: String,
    pub data: Vec<u64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryBreakdown {
    pub category: String,
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

pub fn chart_data(result: &AnalysisResult, keyword_order: &[String]) -> ChartData {
    let labels: Vec<String> = keyword_order
        .iter()
        .filter(|k| result.global_total(k.as_str()) > 0)
        .cloned()
        .collect();
    let total_counts: Vec<u64> = labels.iter().map(|k| result.global_total(k)).collect();

    let mut category_series = Vec::with_capacity(result.len());
    let mut category_breakdowns = Vec::with_capacity(result.len());
    for (category, aggregate) in result.categories() {
        category_series.push(CategorySeries {
            category: category.to_string(),
            data: labels.iter().map(|k| aggregate.keyword_total(k)).collect(),
        });

        let own: Vec<&String> = labels
            .iter()
            .filter(|k| aggregate.keyword_total(k.as_str()) > 0)
            .collect();
        category_breakdowns.push(CategoryBreakdown {
            category: category.to_string(),
            labels: own.iter().map(|k| (*k).clone()).collect(),
            data: own
                .iter()
                .map(|k| aggregate.keyword_total(k.as_str()))
                .collect(),
        });
    }

    ChartData {
        labels,
        total_counts,
        category_series,
        category_breakdowns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::KeywordMatch;
    use crate::process::FileResult;

    fn file_result(category: &str, file_name: &str, counts: &[(&str, u64)]) -> FileResult {
        FileResult {
            category: category.to_string(),
            file_name: file_name.to_string(),
            per_keyword: counts
                .iter()
                .map(|(k, count)| {
                    (
                        k.to_string(),
                        KeywordMatch {
                            count: *count,
                            contexts: Vec::new(),
                        },
                    )
                })
                .collect(),
        }
    }

    fn sample() -> (AnalysisResult, Vec<String>) {
        let result = AnalysisResult::aggregate(vec![
            Ok(file_result("MathA", "doc1.pdf", &[("algebra", 2), ("calculus", 1)])),
            Ok(file_result("MathA", "doc2.pdf", &[("algebra", 1), ("calculus", 0)])),
            Ok(file_result("Hist", "doc3.pdf", &[("algebra", 0), ("calculus", 0)])),
        ]);
        (result, vec!["algebra".to_string(), "calculus".to_string()])
    }

    #[test]
    fn csv_starts_with_bom_and_detail_header() {
        let (result, keywords) = sample();
        let bytes = csv_bytes(&result, &keywords).unwrap();
        assert!(bytes.starts_with("\u{FEFF}".as_bytes()));
        let text = String::from_utf8(bytes).unwrap();
        let first_line = text.trim_start_matches('\u{FEFF}').lines().next().unwrap();
        assert_eq!(
            first_line,
            "\"Categoria\",\"Palabra Clave\",\"Total Apariciones\",\"Archivos con la Palabra (cantidad)\""
        );
    }

    #[test]
    fn csv_detail_rows_join_sorted_files_with_semicolons() {
        let (result, keywords) = sample();
        let text = String::from_utf8(csv_bytes(&result, &keywords).unwrap()).unwrap();
        assert!(text.contains("\"MathA\",\"algebra\",3,\"doc1.pdf (2); doc2.pdf (1)\""));
        assert!(text.contains("\"MathA\",\"calculus\",1,\"doc1.pdf (1)\""));
        // Zero-total pairs are omitted entirely.
        assert!(!text.contains("\"Hist\",\"algebra\""));
    }

    #[test]
    fn csv_summary_block_follows_blank_rows_and_marker() {
        let (result, keywords) = sample();
        let text = String::from_utf8(csv_bytes(&result, &keywords).unwrap()).unwrap();
        assert!(text.contains(SUMMARY_MARKER));
        assert!(text.contains(
            "\"Materia\",\"Archivos Analizados\",\"Total Palabras Clave Encontradas\",\"Palabra Más Frecuente (Apariciones)\""
        ));
        assert!(text.contains("\"MathA\",2,4,\"algebra (3)\""));
        // A category with no hits still gets a summary row.
        assert!(text.contains("\"Hist\",1,0,\"N/A\""));
    }

    #[test]
    fn chart_labels_are_nonzero_keywords_in_entry_order() {
        let result = AnalysisResult::aggregate(vec![Ok(file_result(
            "A",
            "f.pdf",
            &[("zeta", 1), ("alpha", 2), ("unused", 0)],
        ))]);
        let order = vec!["zeta".to_string(), "alpha".to_string(), "unused".to_string()];
        let charts = chart_data(&result, &order);
        assert_eq!(charts.labels, vec!["zeta", "alpha"]);
        assert_eq!(charts.total_counts, vec![1, 2]);
    }

    #[test]
    fn category_series_align_to_labels_with_zero_fill() {
        let (result, keywords) = sample();
        let charts = chart_data(&result, &keywords);
        assert_eq!(charts.labels, vec!["algebra", "calculus"]);
        assert_eq!(charts.total_counts, vec![3, 1]);

        let math = &charts.category_series[0];
        assert_eq!(math.category, "MathA");
        assert_eq!(math.data, vec![3, 1]);
        let hist = &charts.category_series[1];
        assert_eq!(hist.category, "Hist");
        assert_eq!(hist.data, vec![0, 0]);
    }

    #[test]
    fn breakdowns_restrict_to_own_nonzero_keywords() {
        let (result, keywords) = sample();
        let charts = chart_data(&result, &keywords);
        let math = &charts.category_breakdowns[0];
        assert_eq!(math.labels, vec!["algebra", "calculus"]);
        assert_eq!(math.data, vec![3, 1]);
        let hist = &charts.category_breakdowns[1];
        assert!(hist.labels.is_empty());
        assert!(hist.data.is_empty());
    }

    #[test]
    fn save_csv_writes_timestamped_artifact() {
        let (result, keywords) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = save_csv(&result, &keywords, dir.path()).unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_keyword_analysis.csv"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with("\u{FEFF}".as_bytes()));
    }
}
