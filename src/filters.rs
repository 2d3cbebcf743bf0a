use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Match;
use crate::dates::parse_utc_date;

/// Inclusive kickoff-date window. A missing side leaves that end open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// An undated row only passes an unbounded range.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_bounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionUpdate {
    /// Leave whatever the control currently shows.
    NoChange,
    Select(String),
}

/// Selectable matches for the active date range and team, in catalog order.
pub fn compute_options(
    catalog: &[Match],
    range: &DateRange,
    team: Option<&str>,
) -> Vec<MatchOption> {
    let team = team.filter(|t| !t.is_empty());
    catalog
        .iter()
        .filter(|m| range.contains(m.kickoff_date_only))
        .filter(|m| team.is_none_or(|t| m.involves(t)))
        .map(|m| MatchOption {
            label: format!("{} · {}", date_label(m.kickoff_date_only), m.match_name),
            value: m.match_id.clone(),
        })
        .collect()
}

fn date_label(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "TBD".to_string())
}

/// Re-selects the remembered match when it is still offered.
///
/// A remembered id missing from `options` is deliberately not cleared, so it
/// comes back once the filters widen again.
pub fn reconcile_selection(options: &[MatchOption], previous: Option<&str>) -> SelectionUpdate {
    if options.is_empty() {
        return SelectionUpdate::NoChange;
    }
    let Some(previous) = previous.filter(|p| !p.is_empty()) else {
        return SelectionUpdate::NoChange;
    };
    if options.iter().any(|o| o.value == previous) {
        SelectionUpdate::Select(previous.to_string())
    } else {
        SelectionUpdate::NoChange
    }
}

/// Earliest and latest kickoff dates; either side falls back to `today`.
pub fn date_bounds(catalog: &[Match], today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let dates = catalog.iter().filter_map(|m| m.kickoff_date_only);
    let min = dates.clone().min().unwrap_or(today);
    let max = dates.max().unwrap_or(today);
    (min, max)
}

/// Every team name in the catalog, sorted and de-duplicated.
pub fn team_names(catalog: &[Match]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for m in catalog {
        names.insert(m.home_name.clone());
        names.insert(m.away_name.clone());
    }
    names.into_iter().collect()
}

pub fn parse_date_bound(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(parse_utc_date)
}
