use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Match, first_description, scalar_string};

pub const GOAL: &str = "Goal!";
pub const ATTEMPT_AT_GOAL: &str = "Attempt at Goal";
pub const ATTACKING_EVENTS: &[&str] = &[ATTEMPT_AT_GOAL, GOAL];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    pub team_id: String,
    pub player_id: String,
    pub description: String,
    pub match_minute: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Player {
    pub team_id: String,
    pub player_id: String,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnrichedEvent {
    pub team_id: String,
    pub team_name: Option<String>,
    pub player_id: String,
    pub player_name: Option<String>,
    pub description: String,
    pub match_minute: String,
    pub minute: u32,
}

/// Row of the attacking-events table; gaps are blank strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventRow {
    pub team_name: String,
    pub description: String,
    pub match_minute: String,
    pub player_name: String,
}

impl EnrichedEvent {
    pub fn table_row(&self) -> EventRow {
        EventRow {
            team_name: self.team_name.clone().unwrap_or_default(),
            description: self.description.clone(),
            match_minute: self.match_minute.clone(),
            player_name: self.player_name.clone().unwrap_or_default(),
        }
    }
}

pub fn parse_timeline(raw: &Value) -> Vec<Event> {
    let Some(items) = raw.get("Event").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|e| Event {
            team_id: scalar_string(e.get("IdTeam")),
            player_id: scalar_string(e.get("IdPlayer")),
            description: first_description(e.get("TypeLocalized"), ""),
            match_minute: scalar_string(e.get("MatchMinute")),
        })
        .collect()
}

pub fn parse_squad(raw: &Value) -> Vec<Player> {
    let Some(items) = raw.get("Players").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|p| Player {
            team_id: scalar_string(p.get("IdTeam")),
            player_id: scalar_string(p.get("IdPlayer")),
            player_name: first_description(p.get("ShortName"), ""),
        })
        .collect()
}

/// Attaches team and player names to a match's events and keeps only the
/// attacking ones, in timeline order.
pub fn enrich_events(events: &[Event], m: &Match, squads: &[Player]) -> Vec<EnrichedEvent> {
    let mut team_names: HashMap<&str, &str> = HashMap::with_capacity(2);
    team_names.insert(m.home_id.as_str(), m.home_name.as_str());
    team_names.insert(m.away_id.as_str(), m.away_name.as_str());

    let mut player_names: HashMap<&str, &str> = HashMap::with_capacity(squads.len());
    for p in squads {
        player_names
            .entry(p.player_id.as_str())
            .or_insert(p.player_name.as_str());
    }

    events
        .iter()
        .filter(|e| is_attacking(&e.description))
        .map(|e| EnrichedEvent {
            team_id: e.team_id.clone(),
            team_name: team_names.get(e.team_id.as_str()).map(|s| s.to_string()),
            player_id: e.player_id.clone(),
            player_name: player_names.get(e.player_id.as_str()).map(|s| s.to_string()),
            description: e.description.clone(),
            match_minute: e.match_minute.clone(),
            minute: extract_minute(&e.match_minute),
        })
        .collect()
}

pub fn is_attacking(description: &str) -> bool {
    ATTACKING_EVENTS.contains(&description)
}

/// Leading number of a minute label: "45+2" is 45, "HT" is 0.
/// Runs too long for `u32` saturate at `u32::MAX`.
pub fn extract_minute(raw: &str) -> u32 {
    raw.chars()
        .skip_while(|c| !c.is_ascii_digit())
        .map_while(|c| c.to_digit(10))
        .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionRow {
    pub team_name: String,
    pub description: String,
    pub count: usize,
}

/// Event counts per team and type, in first-seen order.
pub fn attacking_distribution(events: &[EnrichedEvent]) -> Vec<DistributionRow> {
    let mut out: Vec<DistributionRow> = Vec::new();
    for e in events {
        let team = e.team_name.clone().unwrap_or_default();
        match out
            .iter_mut()
            .find(|r| r.team_name == team && r.description == e.description)
        {
            Some(row) => row.count += 1,
            None => out.push(DistributionRow {
                team_name: team,
                description: e.description.clone(),
                count: 1,
            }),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinuteBucket {
    pub from: u32,
    pub to: u32,
    pub team_name: String,
    pub count: usize,
}

/// Per-team counts over `bins` equal-width buckets spanning 0..=max minute.
/// Empty buckets are omitted.
pub fn minute_histogram(events: &[EnrichedEvent], bins: u32) -> Vec<MinuteBucket> {
    if events.is_empty() || bins == 0 {
        return Vec::new();
    }
    let max_minute = events.iter().map(|e| e.minute).max().unwrap_or(0);
    let width = max_minute.saturating_add(1).div_ceil(bins).max(1);

    let mut out: Vec<MinuteBucket> = Vec::new();
    for e in events {
        let from = (e.minute / width) * width;
        let team = e.team_name.clone().unwrap_or_default();
        match out.iter_mut().find(|b| b.from == from && b.team_name == team) {
            Some(bucket) => bucket.count += 1,
            None => out.push(MinuteBucket {
                from,
                to: from.saturating_add(width - 1),
                team_name: team,
                count: 1,
            }),
        }
    }
    out.sort_by(|a, b| a.from.cmp(&b.from).then_with(|| a.team_name.cmp(&b.team_name)));
    out
}
