use serde::Serialize;

use crate::aggregate::AnalysisResult;

/// Minimum concentration ratio for a keyword to count as distinctive for a
/// category.
pub const DISTINCTIVE_THRESHOLD: f64 = 0.5;

/// Cross-category statistics derived from one analysis run. Recomputed in
/// full each run, never persisted.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    /// No keyword was found anywhere; the derived statistics are undefined.
    NoMatches,
    Findings(InsightReport),
}

#[derive(Debug, Serialize)]
pub struct InsightReport {
    pub most_frequent: KeywordTotal,
    pub most_shared: SharedKeyword,
    /// Categories with a distinctive keyword, in category order. Categories
    /// clearing no keyword past the threshold are absent.
    pub distinctive: Vec<CategoryDistinctive>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct KeywordTotal {
    pub keyword: String,
    pub total: u64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SharedKeyword {
    pub keyword: String,
    /// Distinct categories where the keyword appears.
    pub category_count: usize,
    /// Total categories in the run, for "x of n" reporting.
    pub category_total: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryDistinctive {
    pub category: String,
    pub keyword: String,
    /// Share of the keyword's global occurrences concentrated here.
    pub ratio: f64,
}

/// Derives the run's summary statistics. All tie-breaks follow keyword entry
/// order: candidates are visited in `keyword_order` and replaced only on a
/// strictly better score, so the first-entered keyword wins ties.
pub fn summarize(result: &AnalysisResult, keyword_order: &[String]) -> Insight {
    let totals: Vec<u64> = keyword_order
        .iter()
        .map(|k| result.global_total(k))
        .collect();
    if totals.iter().sum::<u64>() == 0 {
        return Insight::NoMatches;
    }

    // The zero-total guard above guarantees at least one keyword seeds these;
    // replacement only on a strictly greater score keeps entry-order ties.
    let mut most_frequent = KeywordTotal {
        keyword: String::new(),
        total: 0,
    };
    let mut most_shared = SharedKeyword {
        keyword: String::new(),
        category_count: 0,
        category_total: result.len(),
    };
    for (keyword, &total) in keyword_order.iter().zip(&totals) {
        if total == 0 {
            continue;
        }
        if total > most_frequent.total {
            most_frequent = KeywordTotal {
                keyword: keyword.clone(),
                total,
            };
        }
        let presence = result.category_presence(keyword);
        if presence > most_shared.category_count {
            most_shared = SharedKeyword {
                keyword: keyword.clone(),
                category_count: presence,
                category_total: result.len(),
            };
        }
    }

    let mut distinctive = Vec::new();
    for (category, aggregate) in result.categories() {
        let mut best: Option<(f64, &str)> = None;
        for (keyword, &total) in keyword_order.iter().zip(&totals) {
            if total == 0 {
                continue;
            }
            let ratio = aggregate.keyword_total(keyword) as f64 / total as f64;
            if best.is_none_or(|(max, _)| ratio > max) {
                best = Some((ratio, keyword));
            }
        }
        if let Some((ratio, keyword)) = best {
            if ratio > DISTINCTIVE_THRESHOLD && aggregate.keyword_total(keyword) > 0 {
                distinctive.push(CategoryDistinctive {
                    category: category.to_string(),
                    keyword: keyword.to_string(),
                    ratio,
                });
            }
        }
    }

    Insight::Findings(InsightReport {
        most_frequent,
        most_shared,
        distinctive,
    })
}
