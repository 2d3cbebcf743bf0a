use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dates::parse_utc_date;

const NO_GROUP_RANK: u32 = 999;
const UNKNOWN_STAGE_RANK: u32 = 700;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Match {
    pub match_id: String,
    pub stage_name: String,
    pub group_name: String,
    pub home_id: String,
    pub home_name: String,
    pub away_id: String,
    pub away_name: String,
    pub kickoff_date: String,
    pub match_name: String,
    #[serde(default)]
    pub kickoff_date_only: Option<NaiveDate>,
}

impl Match {
    pub fn involves(&self, team: &str) -> bool {
        self.home_name == team || self.away_name == team
    }
}

/// Normalizes a `/calendar/matches` response into match rows.
///
/// Missing structure never fails: absent sub-objects and fields coalesce to
/// empty strings. A repeated `IdMatch` keeps its first row.
pub fn normalize_matches(raw: &Value) -> Vec<Match> {
    let Some(results) = raw.get("Results").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(results.len());
    for m in results {
        let row = normalize_match(m);
        if !row.match_id.is_empty() && !seen.insert(row.match_id.clone()) {
            tracing::debug!(match_id = %row.match_id, "duplicate match id dropped");
            continue;
        }
        out.push(row);
    }
    out
}

fn normalize_match(m: &Value) -> Match {
    let home = m.get("Home").unwrap_or(&Value::Null);
    let away = m.get("Away").unwrap_or(&Value::Null);
    let home_name = team_display_name(home);
    let away_name = team_display_name(away);
    let kickoff_date = non_empty_str(m.get("LocalDate"))
        .or_else(|| non_empty_str(m.get("Date")))
        .unwrap_or_default();
    let match_name = format!("{home_name} vs {away_name}");

    Match {
        match_id: scalar_string(m.get("IdMatch")),
        stage_name: first_description(m.get("StageName"), ""),
        group_name: first_description(m.get("GroupName"), ""),
        home_id: scalar_string(home.get("IdTeam")),
        home_name,
        away_id: scalar_string(away.get("IdTeam")),
        away_name,
        kickoff_date,
        match_name,
        kickoff_date_only: None,
    }
}

fn team_display_name(team: &Value) -> String {
    if let Some(short) = non_empty_str(team.get("ShortClubName")) {
        return short;
    }
    match team.get("TeamName") {
        Some(Value::Array(_)) => first_description(team.get("TeamName"), ""),
        other => non_empty_str(other).unwrap_or_default(),
    }
}

/// Reads `Description` from the first element of a localized descriptor
/// list such as `[{"Locale": "en-GB", "Description": "Group A"}]`.
pub fn first_description(list: Option<&Value>, default: &str) -> String {
    list.and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|first| first.get("Description"))
        .and_then(|d| non_empty_str(Some(d)))
        .unwrap_or_else(|| default.to_string())
}

/// Stringifies an id-like JSON scalar; null or missing becomes "".
pub fn scalar_string(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    let s = scalar_string(v);
    if s.is_empty() { None } else { Some(s) }
}

/// Rank of the pool letter in `"Group <letter>"` (A=1), or 999 when absent.
pub fn group_rank(group_name: &str) -> u32 {
    let lower = group_name.to_ascii_lowercase();
    let bytes = group_name.as_bytes();
    let mut from = 0;
    while let Some(pos) = lower[from..].find("group") {
        let start = from + pos;
        let mut i = start + "group".len();
        let ws_start = i;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i > ws_start && i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            return u32::from(bytes[i].to_ascii_uppercase() - b'A') + 1;
        }
        from = start + 1;
    }
    NO_GROUP_RANK
}

/// Tournament-progression rank of a stage name. First keyword hit wins, so
/// "Semi-final" ranks as a semifinal and not as the final.
pub fn stage_rank(stage_name: &str) -> u32 {
    let s = stage_name.to_ascii_lowercase();
    if s.contains("group") {
        100
    } else if is_round_of_sixteen(&s) {
        200
    } else if s.contains("quarter") {
        300
    } else if s.contains("semi") {
        400
    } else if s.contains("third") || s.contains("3rd") {
        500
    } else if s.contains("final") {
        600
    } else {
        UNKNOWN_STAGE_RANK
    }
}

fn is_round_of_sixteen(s: &str) -> bool {
    if s.contains("sixteen") {
        return true;
    }
    let mut from = 0;
    while let Some(pos) = s[from..].find("round") {
        let rest = s[from + pos + "round".len()..].trim_start();
        if let Some(rest) = rest.strip_prefix("of") {
            if rest.trim_start().starts_with("16") {
                return true;
            }
        }
        from += pos + 1;
    }
    false
}

fn compare_matches(a: &Match, b: &Match) -> Ordering {
    group_rank(&a.group_name)
        .cmp(&group_rank(&b.group_name))
        .then_with(|| stage_rank(&a.stage_name).cmp(&stage_rank(&b.stage_name)))
        .then_with(|| a.kickoff_date.cmp(&b.kickoff_date))
        .then_with(|| a.match_name.cmp(&b.match_name))
}

/// Orders by group letter, then stage progression, then kickoff, then name.
pub fn sort_matches(matches: &mut [Match]) {
    matches.sort_by(compare_matches);
}

/// Fills `kickoff_date_only` from the kickoff timestamp read as UTC.
pub fn derive_date_only(matches: &mut [Match]) {
    for m in matches {
        m.kickoff_date_only = parse_utc_date(&m.kickoff_date);
    }
}

/// Sorted, date-annotated catalog ready for the filter controls.
pub fn prepare_catalog(mut matches: Vec<Match>) -> Vec<Match> {
    sort_matches(&mut matches);
    derive_date_only(&mut matches);
    matches
}

pub fn find_match<'a>(catalog: &'a [Match], match_id: &str) -> Option<&'a Match> {
    catalog.iter().find(|m| m.match_id == match_id)
}
