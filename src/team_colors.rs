use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIMARY: &str = "#1f77b4";
pub const DEFAULT_SECONDARY: &str = "#2ca02c";

// Below this summed per-channel RGB distance two colors read as the same.
const SIMILARITY_THRESHOLD: u32 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamColorEntry {
    pub name: String,
    pub abbr: String,
    pub home_color: String,
    pub away_color: String,
    pub key_name: String,
    pub key_abbr: String,
}

impl TeamColorEntry {
    pub fn new(
        name: impl Into<String>,
        abbr: impl Into<String>,
        home_color: impl Into<String>,
        away_color: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let abbr = abbr.into();
        Self {
            key_name: lookup_key(&name),
            key_abbr: lookup_key(&abbr),
            name,
            abbr,
            home_color: home_color.into(),
            away_color: away_color.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColorStore {
    entries: Vec<TeamColorEntry>,
}

impl ColorStore {
    pub fn new(entries: Vec<TeamColorEntry>) -> Self {
        Self { entries }
    }

    /// Reads the `team_colors` table. A missing database file is not an
    /// error and yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "team colors db absent, using default palette");
            return Ok(Self::default());
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("open team colors db {}", path.display()))?;
        let mut stmt = conn
            .prepare("SELECT name, abbr, home_color, away_color FROM team_colors")
            .context("prepare team colors query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TeamColorEntry::new(
                    text_column(row, 0)?,
                    text_column(row, 1)?,
                    text_column(row, 2)?,
                    text_column(row, 3)?,
                ))
            })
            .context("query team colors")?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.context("read team colors row")?);
        }
        tracing::debug!(count = entries.len(), "loaded team colors");
        Ok(Self { entries })
    }

    /// Like [`ColorStore::load`] but a broken database also degrades to an
    /// empty store.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            tracing::warn!(%err, "team colors unavailable");
            Self::default()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[TeamColorEntry] {
        &self.entries
    }

    /// Case-insensitive exact match on the team name.
    pub fn find(&self, team_name: &str) -> Option<&TeamColorEntry> {
        let key = lookup_key(team_name);
        self.entries.iter().find(|e| e.key_name == key)
    }

    fn palette(&self, team_name: &str) -> (&str, &str) {
        match self.find(team_name) {
            Some(entry) => (entry.home_color.as_str(), entry.away_color.as_str()),
            None => (DEFAULT_PRIMARY, DEFAULT_SECONDARY),
        }
    }
}

fn text_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<String> {
    use rusqlite::types::ValueRef;
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    })
}

fn lookup_key(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Chart colors for a pairing: each team's primary, except that the second
/// team switches to its secondary once when the primaries clash.
pub fn pick_colors(home_name: &str, away_name: &str, store: &ColorStore) -> (String, String) {
    let (home_color, _) = store.palette(home_name);
    let (away_primary, away_secondary) = store.palette(away_name);

    let away_color = if too_similar(home_color, away_primary) {
        away_secondary
    } else {
        away_primary
    };
    (home_color.to_string(), away_color.to_string())
}

pub fn too_similar(a: &str, b: &str) -> bool {
    match (parse_hex(a), parse_hex(b)) {
        (Some(a), Some(b)) => rgb_distance(a, b) < SIMILARITY_THRESHOLD,
        _ => false,
    }
}

pub fn rgb_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| u32::from(x.abs_diff(*y)))
        .sum()
}

pub fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() < 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
