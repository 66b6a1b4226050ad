use std::collections::{HashMap, HashSet};

use crate::process::{FileFailure, FileResult};

/// One file's contribution to a keyword within a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDetail {
    pub file_name: String,
    pub count: u64,
    pub contexts: Vec<String>,
}

/// Running totals for one category.
///
/// `summary` counts accumulate on every fold call; `file_count` is
/// deduplicated by file name via `seen_files`, so re-folding the same file
/// inflates counts but never the file tally.
#[derive(Debug, Default)]
pub struct CategoryAggregate {
    summary: HashMap<String, u64>,
    details: HashMap<String, Vec<FileDetail>>,
    file_count: usize,
    seen_files: HashSet<String>,
}

impl CategoryAggregate {
    fn fold(&mut self, result: FileResult) {
        if self.seen_files.insert(result.file_name.clone()) {
            self.file_count += 1;
        }
        for (keyword, hit) in result.per_keyword {
            *self.summary.entry(keyword.clone()).or_insert(0) += hit.count;
            if hit.count > 0 {
                self.details.entry(keyword).or_default().push(FileDetail {
                    file_name: result.file_name.clone(),
                    count: hit.count,
                    contexts: hit.contexts,
                });
            }
        }
    }

    /// Cumulative count for one keyword across the category's files.
    pub fn keyword_total(&self, keyword: &str) -> u64 {
        self.summary.get(keyword).copied().unwrap_or(0)
    }

    /// Per-file detail rows for one keyword, sorted by descending count.
    /// The sort happens here, at consumption time, so the fold itself stays
    /// order-insensitive.
    pub fn sorted_details(&self, keyword: &str) -> Vec<&FileDetail> {
        let mut rows: Vec<&FileDetail> = self
            .details
            .get(keyword)
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }

    /// Number of distinct files folded into this category.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Sum of all keyword occurrences in this category.
    pub fn total_found(&self) -> u64 {
        self.summary.values().sum()
    }

    /// The category's single highest-count keyword, resolved in entry order
    /// (strictly greater count replaces), or `None` when nothing was found.
    pub fn top_keyword<'a>(&self, keyword_order: &'a [String]) -> Option<(&'a str, u64)> {
        let mut best: Option<(&str, u64)> = None;
        for keyword in keyword_order {
            let count = self.keyword_total(keyword);
            if count > 0 && best.is_none_or(|(_, max)| count > max) {
                best = Some((keyword, count));
            }
        }
        best
    }
}

/// The engine's single output artifact: per-category aggregates in first-seen
/// fold order.
#[derive(Debug, Default)]
pub struct AnalysisResult {
    order: Vec<String>,
    categories: HashMap<String, CategoryAggregate>,
}

impl AnalysisResult {
    /// Folds successful per-file results into their categories. Failures are
    /// skipped here; the caller surfaces them separately.
    pub fn aggregate(outcomes: Vec<Result<FileResult, FileFailure>>) -> Self {
        let mut result = Self::default();
        for outcome in outcomes.into_iter().flatten() {
            result.entry(&outcome.category).fold(outcome);
        }
        result
    }

    fn entry(&mut self, category: &str) -> &mut CategoryAggregate {
        if !self.categories.contains_key(category) {
            self.order.push(category.to_string());
        }
        self.categories.entry(category.to_string()).or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &CategoryAggregate)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), &self.categories[name]))
    }

    pub fn get(&self, category: &str) -> Option<&CategoryAggregate> {
        self.categories.get(category)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of `summary[c][k]` over all categories.
    pub fn global_total(&self, keyword: &str) -> u64 {
        self.categories
            .values()
            .map(|c| c.keyword_total(keyword))
            .sum()
    }

    /// Number of distinct categories where the keyword was found at all.
    pub fn category_presence(&self, keyword: &str) -> usize {
        self.categories
            .values()
            .filter(|c| c.keyword_total(keyword) > 0)
            .count()
    }
}
