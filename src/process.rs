use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::ExtractError;
use crate::extract::extract_text;
use crate::matcher::{KeywordMatch, KeywordSet, match_keywords};
use crate::normalize::normalize;

/// Category assigned to files sitting directly at the selection root.
pub const ROOT_CATEGORY: &str = "Raíz";

/// Supported document formats, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Pdf,
    Docx,
    Pptx,
}

impl DocFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }
}

/// One candidate file handed to the engine: a path relative to the selection
/// root (category derivation) plus a content source (on disk for the CLI,
/// in memory for embedding and tests).
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub relative_path: PathBuf,
    pub content: FileContent,
}

#[derive(Debug, Clone)]
pub enum FileContent {
    OnDisk(PathBuf),
    InMemory(Vec<u8>),
}

impl SourceFile {
    pub fn on_disk(relative_path: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: FileContent::OnDisk(path.into()),
        }
    }

    pub fn in_memory(relative_path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: FileContent::InMemory(bytes),
        }
    }

    pub fn file_name(&self) -> String {
        self.relative_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The immediate parent folder name, or [`ROOT_CATEGORY`] for files at
    /// the root of the selection.
    pub fn category(&self) -> String {
        let mut segments: Vec<&str> = self
            .relative_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        segments.pop(); // drop the file name itself
        match segments.last() {
            Some(parent) => (*parent).to_string(),
            None => ROOT_CATEGORY.to_string(),
        }
    }

    pub fn format(&self) -> Option<DocFormat> {
        DocFormat::from_path(&self.relative_path)
    }

    fn bytes(&self) -> Result<Vec<u8>, ExtractError> {
        match &self.content {
            FileContent::OnDisk(path) => Ok(fs::read(path)?),
            FileContent::InMemory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Per-document analysis outcome. Either exists whole (success) or not at
/// all; a failed extraction is recorded as [`FileFailure`] instead.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub category: String,
    pub file_name: String,
    pub per_keyword: HashMap<String, KeywordMatch>,
}

/// One file's terminal extraction failure. Never aborts sibling files.
#[derive(Debug)]
pub struct FileFailure {
    pub file_name: String,
    pub error: ExtractError,
}

/// Classifies, extracts, normalizes, and matches one file. Unsupported
/// extensions are filtered upstream; reaching here without a known format is
/// reported as a failure rather than a panic.
pub fn process_file(file: &SourceFile, keywords: &KeywordSet) -> Result<FileResult, FileFailure> {
    let file_name = file.file_name();
    let fail = |error| FileFailure {
        file_name: file_name.clone(),
        error,
    };

    let format = file.format().ok_or_else(|| {
        fail(ExtractError::UnsupportedFormat(
            file.relative_path.display().to_string(),
        ))
    })?;
    let bytes = file.bytes().map_err(&fail)?;
    let text = extract_text(&bytes, format).map_err(&fail)?;

    let normalized = normalize(&text);
    Ok(FileResult {
        category: file.category(),
        file_name,
        per_keyword: match_keywords(&normalized, keywords),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::prepare_keywords;

    #[test]
    fn category_is_second_to_last_segment() {
        let f = SourceFile::in_memory("Semestre1/MathA/doc1.pdf", Vec::new());
        assert_eq!(f.category(), "MathA");
        assert_eq!(f.file_name(), "doc1.pdf");
    }

    #[test]
    fn root_files_use_sentinel_category() {
        let f = SourceFile::in_memory("doc1.pdf", Vec::new());
        assert_eq!(f.category(), ROOT_CATEGORY);
    }

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(DocFormat::from_path(Path::new("a/b.PDF")), Some(DocFormat::Pdf));
        assert_eq!(DocFormat::from_path(Path::new("b.Docx")), Some(DocFormat::Docx));
        assert_eq!(DocFormat::from_path(Path::new("c.pptx")), Some(DocFormat::Pptx));
        assert_eq!(DocFormat::from_path(Path::new("d.txt")), None);
        assert_eq!(DocFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn extraction_failure_is_isolated_per_file() {
        let set = KeywordSet::compile(&prepare_keywords(&["algebra"])).unwrap();
        let bad = SourceFile::in_memory("MathA/broken.docx", b"not a zip".to_vec());
        let failure = process_file(&bad, &set).unwrap_err();
        assert_eq!(failure.file_name, "broken.docx");
    }
}
