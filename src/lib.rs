#![forbid(unsafe_code)]
//! # Keyword Occurrence Analysis Engine
//!
//! Scans a folder of documents (`.pdf`, `.docx`, `.pptx`), counts whole-word
//! occurrences of a user-supplied keyword list per document and per
//! folder-derived category, and derives summary statistics, context
//! snippets, chart-ready series, and a CSV artifact.
//!
//! The pipeline: candidate files fan out to independent [`process_file`]
//! tasks (rayon), all tasks settle regardless of individual failures, and a
//! single-threaded fold builds the [`AnalysisResult`] that everything
//! downstream (insights, CSV, charts) reads.
//!
//! ## Example
//! ```no_run
//! use keyword_analysis::{collect_files, run_analysis};
//! use std::path::Path;
//!
//! let files = collect_files(Path::new("notes/"));
//! let keywords = vec!["Algebra".to_string(), "calculus".to_string()];
//! let report = run_analysis(files, &keywords)?;
//! println!("{} categories", report.result.len());
//! # Ok::<(), keyword_analysis::AnalysisError>(())
//! ```

use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;
use walkdir::WalkDir;

mod aggregate;
mod error;
mod export;
mod extract;
mod insights;
mod matcher;
mod normalize;
mod process;

pub use aggregate::{AnalysisResult, CategoryAggregate, FileDetail};
pub use error::{AnalysisError, ExtractError};
pub use export::{CategoryBreakdown, CategorySeries, ChartData, chart_data, csv_bytes, save_csv};
pub use extract::{
    extract_text, extract_text_from_docx, extract_text_from_pdf, extract_text_from_pptx,
};
pub use insights::{
    CategoryDistinctive, Insight, InsightReport, KeywordTotal, SharedKeyword, summarize,
};
pub use matcher::{KeywordMatch, KeywordSet, match_keywords, prepare_keywords};
pub use normalize::{NormalizedText, normalize};
pub use process::{
    DocFormat, FileContent, FileFailure, FileResult, ROOT_CATEGORY, SourceFile, process_file,
};

/// Everything one run produces: the aggregate, the derived insight, and the
/// list of files whose extraction failed (non-fatal to the batch).
#[derive(Debug)]
pub struct AnalysisReport {
    /// The prepared keyword list, in entry order.
    pub keywords: Vec<String>,
    pub result: AnalysisResult,
    pub insight: Insight,
    pub failed_files: Vec<FileFailure>,
}

/// Walks `root` and returns every regular file as a [`SourceFile`] with a
/// root-relative path. No extension filtering happens here; the engine
/// distinguishes "nothing selected" from "nothing supported".
pub fn collect_files(root: &Path) -> Vec<SourceFile> {
    let mut files: Vec<SourceFile> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let path = entry.path().to_path_buf();
            let relative: PathBuf = match path.strip_prefix(root) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
                // `root` itself is a file.
                _ => path.file_name().map(PathBuf::from).unwrap_or_default(),
            };
            SourceFile::on_disk(relative, path)
        })
        .collect();
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    files
}

/// Runs the whole engine over the selected files.
///
/// Pre-flight validation rejects an empty selection, an empty keyword list,
/// and a selection without any supported file before any processing starts.
/// After that, per-file failures are collected, never propagated: one
/// corrupt document costs only its own contribution.
pub fn run_analysis(
    files: Vec<SourceFile>,
    keywords: &[String],
) -> Result<AnalysisReport, AnalysisError> {
    if files.is_empty() {
        return Err(AnalysisError::NoInputSelected);
    }
    let keywords = prepare_keywords(keywords);
    if keywords.is_empty() {
        return Err(AnalysisError::NoKeywordsProvided);
    }
    let supported: Vec<SourceFile> = files.into_iter().filter(|f| f.format().is_some()).collect();
    if supported.is_empty() {
        return Err(AnalysisError::NoSupportedFiles);
    }

    let keyword_set = KeywordSet::compile(&keywords)?;
    info!(
        "processing {} files with {} keywords",
        supported.len(),
        keyword_set.len()
    );

    // Settle-all fan-out: every task yields a value, no failure cancels a
    // sibling, and the ordered collect keeps category first-seen order
    // deterministic.
    let outcomes: Vec<Result<FileResult, FileFailure>> = supported
        .par_iter()
        .map(|file| process_file(file, &keyword_set))
        .collect();

    let mut successes = Vec::with_capacity(outcomes.len());
    let mut failed_files = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(result) => successes.push(Ok(result)),
            Err(failure) => {
                debug!(
                    "extraction failed for {}: {}",
                    failure.file_name, failure.error
                );
                failed_files.push(failure);
            }
        }
    }

    let result = AnalysisResult::aggregate(successes);
    let insight = summarize(&result, &keywords);

    Ok(AnalysisReport {
        keywords,
        result,
        insight,
        failed_files,
    })
}

/// Lists files that failed extraction on stderr, after the main report.
pub fn print_failed_files(failed_files: &[FileFailure]) {
    eprintln!("\n{} file(s) could not be processed:", failed_files.len());
    for failure in failed_files {
        eprintln!("  {}: {}", failure.file_name, failure.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_is_rejected_before_processing() {
        let err = run_analysis(Vec::new(), &["algebra".to_string()]).unwrap_err();
        assert!(matches!(err, AnalysisError::NoInputSelected));
    }

    #[test]
    fn empty_keyword_list_is_rejected_before_processing() {
        let files = vec![SourceFile::in_memory("MathA/doc.pdf", Vec::new())];
        let err = run_analysis(files, &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::NoKeywordsProvided));
    }

    #[test]
    fn whitespace_only_keywords_count_as_none() {
        let files = vec![SourceFile::in_memory("MathA/doc.pdf", Vec::new())];
        let err = run_analysis(files, &["  ".to_string(), String::new()]).unwrap_err();
        assert!(matches!(err, AnalysisError::NoKeywordsProvided));
    }

    #[test]
    fn unsupported_only_selection_is_rejected() {
        let files = vec![
            SourceFile::in_memory("notes.txt", Vec::new()),
            SourceFile::in_memory("image.png", Vec::new()),
        ];
        let err = run_analysis(files, &["algebra".to_string()]).unwrap_err();
        assert!(matches!(err, AnalysisError::NoSupportedFiles));
    }

    #[test]
    fn all_failed_extractions_yield_empty_result_not_error() {
        let files = vec![SourceFile::in_memory("MathA/broken.docx", b"junk".to_vec())];
        let report = run_analysis(files, &["algebra".to_string()]).unwrap();
        assert!(report.result.is_empty());
        assert_eq!(report.failed_files.len(), 1);
        assert!(matches!(report.insight, Insight::NoMatches));
    }
}
