use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::model::{MonthGroup, YearGroup};

// Matches headings of any level whose text starts with an italicized
// YYYY-MM-DD token. Non-italic dates are invisible to the extractor.
static DATE_ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6} \*(\d{4}-\d{2}-\d{2})\*").unwrap());

/// Find italicized date headings in raw markdown, in document order.
/// Duplicates are preserved; calendar validity is checked later when
/// grouping, not here.
pub fn extract_date_anchors(markdown: &str) -> Vec<String> {
    DATE_ANCHOR_RE
        .captures_iter(markdown)
        .map(|c| c[1].to_string())
        .collect()
}

/// Split date anchors into the current-month bucket and the archive.
///
/// The current month is the chronologically latest (year, month) among the
/// valid dates; its dates keep their document order. Every other group
/// becomes a `MonthGroup`, sorted newest first. Dates that fail calendar
/// parsing are discarded silently.
pub fn group_dates_by_month(dates: &[String]) -> (Vec<String>, Vec<MonthGroup>) {
    // (year, month) groups in first-seen order
    let mut groups: Vec<((i32, u32), NaiveDate, Vec<String>)> = Vec::new();

    for d in dates {
        let Ok(parsed) = NaiveDate::parse_from_str(d, "%Y-%m-%d") else {
            continue;
        };
        let key = (parsed.year(), parsed.month());
        match groups.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, group_dates)) => group_dates.push(d.clone()),
            None => groups.push((key, parsed, vec![d.clone()])),
        }
    }

    if groups.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let current_key = groups.iter().map(|(k, _, _)| *k).max().unwrap_or_default();

    let mut current_month = Vec::new();
    let mut archived: Vec<((i32, u32), NaiveDate, Vec<String>)> = Vec::new();
    for group in groups {
        if group.0 == current_key {
            current_month = group.2;
        } else {
            archived.push(group);
        }
    }

    archived.sort_by(|a, b| b.0.cmp(&a.0));

    let archived = archived
        .into_iter()
        .map(|((year, _), first, group_dates)| MonthGroup {
            year,
            month: first.format("%B").to_string(),
            dates: group_dates,
        })
        .collect();

    (current_month, archived)
}

/// Fold archived months into per-year buckets. Years are ordered newest
/// first; months within a year keep their input order (already newest-first
/// from `group_dates_by_month`).
pub fn group_months_by_year(months: Vec<MonthGroup>) -> Vec<YearGroup> {
    let mut years: Vec<YearGroup> = Vec::new();

    for month in months {
        match years.iter_mut().find(|y| y.year == month.year) {
            Some(year) => year.months.push(month),
            None => years.push(YearGroup {
                year: month.year,
                months: vec![month],
            }),
        }
    }

    years.sort_by(|a, b| b.year.cmp(&a.year));
    years
}
