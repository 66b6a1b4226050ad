use std::io;

use thiserror::Error;

/// Pre-flight validation failures. Any of these aborts the run before a
/// single file is processed; a previous analysis result is never overwritten.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no files selected")]
    NoInputSelected,

    #[error("no keywords provided")]
    NoKeywordsProvided,

    #[error("no supported files (.pdf, .docx, .pptx) in the selection")]
    NoSupportedFiles,

    #[error("keyword {keyword:?} could not be compiled into a matcher: {source}")]
    InvalidKeyword {
        keyword: String,
        source: regex::Error,
    },
}

/// Per-file extraction failures. Non-fatal to the batch: the file is dropped
/// from the aggregate and reported in the failure list.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("archive could not be opened: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("missing {0} in archive")]
    MissingEntry(&'static str),

    #[error("XML parsing failed: {0}")]
    Xml(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}
