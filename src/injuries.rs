use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::parse_utc_date;

const SYNTHETIC_ROWS: usize = 40;
const SYNTHETIC_TYPES: [&str; 4] = ["Muscle", "Impact", "Overuse", "Joint"];
const SYNTHETIC_SEVERITIES: [&str; 4] = ["Minor", "Moderate", "Severe", "Minor"];
const SYNTHETIC_DAYS_OUT: [u32; 4] = [3, 10, 21, 5];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Injury {
    pub date: NaiveDate,
    pub player: String,
    pub kind: String,
    pub severity: String,
    pub days_out: u32,
}

#[derive(Debug, Deserialize)]
struct InjuryRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Player", default)]
    player: String,
    #[serde(rename = "Type", default)]
    kind: String,
    #[serde(rename = "Severity", default)]
    severity: String,
    #[serde(rename = "DaysOut", default)]
    days_out: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InjuryRow {
    pub date: String,
    pub player: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub severity: String,
    pub days_out: u32,
}

/// Reads the injury log, or the synthetic sample when the file is absent.
/// Rows with an unreadable date are dropped.
pub fn load_injuries(path: &Path) -> Result<Vec<Injury>> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "injury log absent, using synthetic sample");
        return Ok(synthetic_injuries());
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open injury log {}", path.display()))?;

    let mut out = Vec::new();
    for (idx, record) in reader.deserialize::<InjuryRecord>().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(row = idx + 1, %err, "skipping malformed injury row");
                continue;
            }
        };
        let Some(date) = parse_utc_date(&record.date) else {
            continue;
        };
        out.push(Injury {
            date,
            player: record.player,
            kind: record.kind,
            severity: record.severity,
            days_out: parse_days_out(&record.days_out),
        });
    }
    Ok(out)
}

fn parse_days_out(raw: &str) -> u32 {
    let raw = raw.trim();
    raw.parse::<u32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u32))
        .unwrap_or(0)
}

pub fn synthetic_injuries() -> Vec<Injury> {
    let Some(first) = NaiveDate::from_ymd_opt(2024, 8, 1) else {
        return Vec::new();
    };
    (0..SYNTHETIC_ROWS)
        .map(|i| Injury {
            date: first + Duration::days(3 * i as i64),
            player: format!("Player {}", i % 8 + 1),
            kind: SYNTHETIC_TYPES[i % 4].to_string(),
            severity: SYNTHETIC_SEVERITIES[i % 4].to_string(),
            days_out: SYNTHETIC_DAYS_OUT[i % 4],
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjuryFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub player: Option<String>,
    pub kind: Option<String>,
}

impl InjuryFilter {
    pub fn matches(&self, injury: &Injury) -> bool {
        self.start.is_none_or(|s| injury.date >= s)
            && self.end.is_none_or(|e| injury.date <= e)
            && non_empty(&self.player).is_none_or(|p| injury.player == p)
            && non_empty(&self.kind).is_none_or(|k| injury.kind == k)
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

pub fn filter_injuries(injuries: &[Injury], filter: &InjuryFilter) -> Vec<Injury> {
    injuries
        .iter()
        .filter(|i| filter.matches(i))
        .cloned()
        .collect()
}

pub fn players(injuries: &[Injury]) -> Vec<String> {
    sorted_unique(injuries.iter().map(|i| i.player.as_str()))
}

pub fn types(injuries: &[Injury]) -> Vec<String> {
    sorted_unique(injuries.iter().map(|i| i.kind.as_str()))
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub series: String,
    pub count: usize,
}

/// Injuries per type, split by severity.
pub fn type_severity_counts(injuries: &[Injury]) -> Vec<CategoryCount> {
    count_by(injuries, |i| (i.kind.clone(), i.severity.clone()))
}

/// Injuries per `YYYY-MM` month, split by type.
pub fn monthly_counts(injuries: &[Injury]) -> Vec<CategoryCount> {
    count_by(injuries, |i| {
        (
            format!("{:04}-{:02}", i.date.year(), i.date.month()),
            i.kind.clone(),
        )
    })
}

fn count_by(
    injuries: &[Injury],
    key: impl Fn(&Injury) -> (String, String),
) -> Vec<CategoryCount> {
    let mut out: Vec<CategoryCount> = Vec::new();
    for injury in injuries {
        let (category, series) = key(injury);
        match out
            .iter_mut()
            .find(|c| c.category == category && c.series == series)
        {
            Some(c) => c.count += 1,
            None => out.push(CategoryCount {
                category,
                series,
                count: 1,
            }),
        }
    }
    out.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.series.cmp(&b.series)));
    out
}

pub fn table_rows(injuries: &[Injury]) -> Vec<InjuryRow> {
    injuries
        .iter()
        .map(|i| InjuryRow {
            date: i.date.format("%Y-%m-%d").to_string(),
            player: i.player.clone(),
            kind: i.kind.clone(),
            severity: i.severity.clone(),
            days_out: i.days_out,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_days_out;

    #[test]
    fn days_out_tolerates_float_cells() {
        assert_eq!(parse_days_out("10"), 10);
        assert_eq!(parse_days_out("21.0"), 21);
        assert_eq!(parse_days_out(""), 0);
        assert_eq!(parse_days_out("n/a"), 0);
    }
}
