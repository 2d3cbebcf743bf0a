use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::catalog::{Match, find_match, prepare_catalog};
use crate::config::{CacheBackend, Config};
use crate::events::{
    DistributionRow, EnrichedEvent, EventRow, MinuteBucket, attacking_distribution,
    enrich_events, minute_histogram,
};
use crate::fifa_data::FifaData;
use crate::filters::{
    DateRange, MatchOption, SelectionUpdate, compute_options, date_bounds, reconcile_selection,
    team_names,
};
use crate::http_client::ApiClient;
use crate::injuries::{
    CategoryCount, InjuryFilter, InjuryRow, filter_injuries, load_injuries, monthly_counts,
    players, synthetic_injuries, table_rows, type_severity_counts, types,
};
use crate::result_cache::{Cache, FileCache, shared_cache};
use crate::team_colors::{ColorStore, pick_colors};

const TIMELINE_BINS: u32 = 40;

/// Who is looking at the page. Passed explicitly to every page function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageAccess<T> {
    RedirectToLogin,
    Granted(T),
}

impl<T> PageAccess<T> {
    pub fn granted(self) -> Option<T> {
        match self {
            PageAccess::Granted(page) => Some(page),
            PageAccess::RedirectToLogin => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformancePage {
    pub catalog: Vec<Match>,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub teams: Vec<String>,
}

impl PerformancePage {
    /// The "no matches found" state.
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn options(&self, range: &DateRange, team: Option<&str>) -> Vec<MatchOption> {
        compute_options(&self.catalog, range, team)
    }

    pub fn reconcile(&self, options: &[MatchOption], previous: Option<&str>) -> SelectionUpdate {
        reconcile_selection(options, previous)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamColor {
    pub team_name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetail {
    pub title: String,
    pub events: Vec<EnrichedEvent>,
    pub table: Vec<EventRow>,
    pub colors: [TeamColor; 2],
    pub timeline: Vec<MinuteBucket>,
    pub distribution: Vec<DistributionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicalPage {
    pub players: Vec<String>,
    pub types: Vec<String>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub by_type_severity: Vec<CategoryCount>,
    pub per_month: Vec<CategoryCount>,
    pub table: Vec<InjuryRow>,
}

pub struct Dashboard {
    data: FifaData,
    match_count: u32,
    team_colors_db: PathBuf,
    injuries_csv: PathBuf,
}

impl Dashboard {
    pub fn new(
        data: FifaData,
        match_count: u32,
        team_colors_db: impl Into<PathBuf>,
        injuries_csv: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data,
            match_count,
            team_colors_db: team_colors_db.into(),
            injuries_csv: injuries_csv.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let api = Arc::new(ApiClient::new(&config.base_url, &config.language));
        let file_cache = match config.cache_backend {
            CacheBackend::File => FileCache::at_default_location(),
            CacheBackend::Memory => None,
        };
        let cache: Arc<dyn Cache> = match file_cache {
            Some(file) => {
                tracing::info!(path = %file.path().display(), "using file-backed result cache");
                Arc::new(file) as Arc<dyn Cache>
            }
            None => shared_cache() as Arc<dyn Cache>,
        };
        let data = FifaData::new(api, cache, config.ids.clone());
        Self::new(
            data,
            config.match_count,
            &config.team_colors_db,
            &config.injuries_csv,
        )
    }

    pub fn performance_page(&self, session: &Session) -> PageAccess<PerformancePage> {
        if !session.is_authenticated() {
            return PageAccess::RedirectToLogin;
        }
        let catalog = prepare_catalog(self.data.season_matches(self.match_count));
        let (min_date, max_date) = date_bounds(&catalog, Utc::now().date_naive());
        let teams = team_names(&catalog);
        tracing::info!(matches = catalog.len(), teams = teams.len(), "performance page ready");
        PageAccess::Granted(PerformancePage {
            catalog,
            min_date,
            max_date,
            teams,
        })
    }

    /// Attacking-event view of one match. `None` when the id is not in the
    /// catalog; an empty event list when the timeline could not be fetched.
    pub fn match_detail(&self, catalog: &[Match], match_id: &str) -> Option<MatchDetail> {
        if match_id.is_empty() {
            return None;
        }
        let m = find_match(catalog, match_id)?;
        let events = self.data.events_for(&m.match_id);
        let squads = self
            .data
            .squads_for(&[m.home_id.clone(), m.away_id.clone()]);
        let enriched = enrich_events(&events, m, &squads);

        let store = ColorStore::load_or_empty(&self.team_colors_db);
        let (home_color, away_color) = pick_colors(&m.home_name, &m.away_name, &store);

        let date = m
            .kickoff_date_only
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        Some(MatchDetail {
            title: format!("Attacking Events per minute - {} ({date})", m.match_name),
            table: enriched.iter().map(EnrichedEvent::table_row).collect(),
            timeline: minute_histogram(&enriched, TIMELINE_BINS),
            distribution: attacking_distribution(&enriched),
            colors: [
                TeamColor {
                    team_name: m.home_name.clone(),
                    color: home_color,
                },
                TeamColor {
                    team_name: m.away_name.clone(),
                    color: away_color,
                },
            ],
            events: enriched,
        })
    }

    pub fn medical_page(
        &self,
        session: &Session,
        filter: &InjuryFilter,
    ) -> PageAccess<MedicalPage> {
        if !session.is_authenticated() {
            return PageAccess::RedirectToLogin;
        }
        let all = load_injuries(&self.injuries_csv).unwrap_or_else(|err| {
            tracing::warn!(%err, "injury log unreadable, using synthetic sample");
            synthetic_injuries()
        });
        let selected = filter_injuries(&all, filter);
        PageAccess::Granted(MedicalPage {
            players: players(&all),
            types: types(&all),
            min_date: all.iter().map(|i| i.date).min(),
            max_date: all.iter().map(|i| i.date).max(),
            by_type_severity: type_severity_counts(&selected),
            per_month: monthly_counts(&selected),
            table: table_rows(&selected),
        })
    }
}
