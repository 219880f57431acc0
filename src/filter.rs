//! Post-scoring filters: category and publication window.

use crate::document::Document;
use crate::ranking::ScoredDocument;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication window relative to the query's `today`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DateRange {
    #[default]
    All,
    PastWeek,
    PastMonth,
    ThisYear,
}

impl DateRange {
    /// Parse leniently; anything unrecognised means `All`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" | "pastweek" | "past-week" | "past_week" => Self::PastWeek,
            "month" | "pastmonth" | "past-month" | "past_month" => Self::PastMonth,
            "year" | "thisyear" | "this-year" | "this_year" => Self::ThisYear,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::PastWeek => "pastWeek",
            Self::PastMonth => "pastMonth",
            Self::ThisYear => "thisYear",
        }
    }

    /// Whether a post dated `date` falls inside the window ending at `today`.
    ///
    /// Undated posts only pass the `All` window.
    pub fn contains(&self, date: Option<NaiveDate>, today: NaiveDate) -> bool {
        let date = match (self, date) {
            (Self::All, _) => return true,
            (_, None) => return false,
            (_, Some(date)) => date,
        };

        let age_days = today.signed_duration_since(date).num_days();
        match self {
            Self::All => true,
            Self::PastWeek => age_days <= 7,
            Self::PastMonth => age_days <= 30,
            Self::ThisYear => date.year() == today.year(),
        }
    }
}

impl From<&str> for DateRange {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for DateRange {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<DateRange> for String {
    fn from(value: DateRange) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalise a category selection: blank or "all" (any case) means no filter.
///
/// Any other value is returned untouched for exact comparison.
pub fn category_filter(category: Option<&str>) -> Option<&str> {
    category.filter(|c| {
        let c = c.trim();
        !c.is_empty() && !c.eq_ignore_ascii_case("all")
    })
}

/// Exact, case-sensitive category check
pub fn matches_category(doc: &Document, category: Option<&str>) -> bool {
    match category_filter(category) {
        Some(wanted) => doc.category == wanted,
        None => true,
    }
}

/// Apply the filter stages in order: positive score, category, date window
pub fn apply_filters<'a>(
    scored: Vec<ScoredDocument<'a>>,
    category: Option<&str>,
    date_range: DateRange,
    today: NaiveDate,
) -> Vec<ScoredDocument<'a>> {
    let category = category_filter(category);

    scored
        .into_iter()
        .filter(|sd| sd.score > 0)
        .filter(|sd| matches_category(sd.document, category))
        .filter(|sd| date_range.contains(sd.document.published_on(), today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!(DateRange::parse("pastWeek"), DateRange::PastWeek);
        assert_eq!(DateRange::parse("week"), DateRange::PastWeek);
        assert_eq!(DateRange::parse("MONTH"), DateRange::PastMonth);
        assert_eq!(DateRange::parse("thisYear"), DateRange::ThisYear);
        assert_eq!(DateRange::parse("fortnight"), DateRange::All);
        assert_eq!(DateRange::parse(""), DateRange::All);
    }

    #[test]
    fn test_serde_round_trip_via_strings() {
        let range: DateRange = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(range, DateRange::All);
        assert_eq!(serde_json::to_string(&DateRange::PastMonth).unwrap(), "\"pastMonth\"");
    }

    #[test]
    fn test_windows() {
        let today = ymd(2024, 10, 12);
        assert!(DateRange::PastWeek.contains(Some(ymd(2024, 10, 5)), today));
        assert!(!DateRange::PastWeek.contains(Some(ymd(2024, 10, 4)), today));
        assert!(DateRange::PastMonth.contains(Some(ymd(2024, 9, 12)), today));
        assert!(!DateRange::PastMonth.contains(Some(ymd(2024, 9, 11)), today));
        assert!(DateRange::ThisYear.contains(Some(ymd(2024, 1, 1)), today));
        assert!(!DateRange::ThisYear.contains(Some(ymd(2023, 12, 31)), today));
    }

    #[test]
    fn test_undated_only_in_all() {
        let today = ymd(2024, 10, 12);
        assert!(DateRange::All.contains(None, today));
        assert!(!DateRange::PastWeek.contains(None, today));
        assert!(!DateRange::ThisYear.contains(None, today));
    }

    #[test]
    fn test_category_filter_sentinels() {
        assert_eq!(category_filter(None), None);
        assert_eq!(category_filter(Some("")), None);
        assert_eq!(category_filter(Some("All")), None);
        assert_eq!(category_filter(Some("all")), None);
        assert_eq!(category_filter(Some("DeFi")), Some("DeFi"));
    }

    #[test]
    fn test_category_is_case_sensitive() {
        let doc = Document::new(1, "t", "e", "c", "DeFi");
        assert!(matches_category(&doc, Some("DeFi")));
        assert!(!matches_category(&doc, Some("defi")));
        assert!(!matches_category(&doc, Some(" DeFi")));
        assert!(!matches_category(&doc, Some("DeFi ")));
        assert!(matches_category(&doc, Some(" All ")));
    }

    #[test]
    fn test_apply_filters() {
        let today = ymd(2024, 10, 12);
        let a = Document::new(1, "a", "a", "a", "DeFi").with_date("2024-10-10");
        let b = Document::new(2, "b", "b", "b", "DeFi").with_date("garbage");
        let c = Document::new(3, "c", "c", "c", "NFTs").with_date("2024-10-11");

        let scored = vec![
            ScoredDocument::new(&a, 12, 0),
            ScoredDocument::new(&b, 9, 1),
            ScoredDocument::new(&c, 0, 2),
        ];

        let all = apply_filters(scored.clone(), Some("DeFi"), DateRange::All, today);
        assert_eq!(all.iter().map(|s| s.document.id).collect::<Vec<_>>(), vec![1, 2]);

        let week = apply_filters(scored, None, DateRange::PastWeek, today);
        assert_eq!(week.iter().map(|s| s.document.id).collect::<Vec<_>>(), vec![1]);
    }
}
