//! arXiv search expression for the daily run.

use chrono::{Days, Local, NaiveDate};

/// Category every result must belong to.
pub const CATEGORY: &str = "quant-ph";

/// Keyword disjunction, in arXiv query syntax.
pub const KEYWORDS: &str = r#"("quantum comput" OR qubit)"#;

/// Start of the window, in days before today.
pub const WINDOW_START_DAYS_AGO: u64 = 6;

/// End of the window, in days before today.
pub const WINDOW_END_DAYS_AGO: u64 = 5;

/// A one-day submission window search.
///
/// arXiv takes a few days to make new submissions searchable, so the window
/// trails today by five days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// First day of the window.
    pub date_from: NaiveDate,
    /// Last day of the window.
    pub date_to: NaiveDate,
}

impl SearchQuery {
    /// Window relative to the given day.
    #[must_use]
    pub fn for_date(today: NaiveDate) -> Self {
        Self {
            date_from: today - Days::new(WINDOW_START_DAYS_AGO),
            date_to: today - Days::new(WINDOW_END_DAYS_AGO),
        }
    }

    /// Window relative to the local date.
    #[must_use]
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    /// The `search_query` parameter value.
    #[must_use]
    pub fn expression(&self) -> String {
        format!(
            "cat:{} AND submittedDate:[{} TO {}] AND {}",
            CATEGORY,
            self.date_from.format("%Y%m%d"),
            self.date_to.format("%Y%m%d"),
            KEYWORDS
        )
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expression())
    }
}
