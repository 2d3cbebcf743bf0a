use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.fifa.com/api/v3";
pub const DEFAULT_COMPETITION_ID: &str = "106";
pub const DEFAULT_SEASON_ID: &str = "288439";
pub const DEFAULT_STAGE_ID: &str = "288440";
const DEFAULT_MATCH_COUNT: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    File,
}

/// Identifiers of the tournament every query runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentIds {
    pub competition_id: String,
    pub season_id: String,
    pub stage_id: String,
}

impl Default for TournamentIds {
    fn default() -> Self {
        Self {
            competition_id: DEFAULT_COMPETITION_ID.to_string(),
            season_id: DEFAULT_SEASON_ID.to_string(),
            stage_id: DEFAULT_STAGE_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub language: String,
    pub ids: TournamentIds,
    pub match_count: u32,
    pub team_colors_db: PathBuf,
    pub injuries_csv: PathBuf,
    pub cache_backend: CacheBackend,
}

impl Config {
    pub fn from_env() -> Self {
        let base_url = env_string("FIFA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let language = env_string("FIFA_LANG").unwrap_or_else(|| "en".to_string());
        let ids = TournamentIds {
            competition_id: env_string("FIFA_COMPETITION_ID")
                .unwrap_or_else(|| DEFAULT_COMPETITION_ID.to_string()),
            season_id: env_string("FIFA_SEASON_ID")
                .unwrap_or_else(|| DEFAULT_SEASON_ID.to_string()),
            stage_id: env_string("FIFA_STAGE_ID").unwrap_or_else(|| DEFAULT_STAGE_ID.to_string()),
        };
        let match_count = env_string("FIFA_MATCH_COUNT")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MATCH_COUNT)
            .max(1);
        let team_colors_db = env_string("TEAM_COLORS_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assets/team_colors.db"));
        let injuries_csv = env_string("INJURIES_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assets/injuries.csv"));
        let cache_backend = match env_string("RESULT_CACHE")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            Some("file") => CacheBackend::File,
            _ => CacheBackend::Memory,
        };

        Self {
            base_url,
            language,
            ids,
            match_count,
            team_colors_db,
            injuries_csv,
            cache_backend,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
