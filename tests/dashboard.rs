mod common;

use std::sync::Arc;

use common::{FakeApi, fixture_json, temp_path};
use futsal_pulse::config::TournamentIds;
use futsal_pulse::dashboard::{Dashboard, PageAccess, Session};
use futsal_pulse::fifa_data::FifaData;
use futsal_pulse::filters::{DateRange, SelectionUpdate};
use futsal_pulse::injuries::InjuryFilter;
use futsal_pulse::result_cache::MemoryCache;
use futsal_pulse::team_colors::{DEFAULT_PRIMARY, DEFAULT_SECONDARY};

fn full_api() -> FakeApi {
    FakeApi::new()
        .route("/calendar/matches", fixture_json("matches.json"))
        .route("/timelines/106/288439/288440/300001", fixture_json("timeline.json"))
        .route("/teams/43922/squad", fixture_json("squad_43922.json"))
        .route("/teams/43960/squad", fixture_json("squad_43960.json"))
}

fn dashboard(api: FakeApi) -> Dashboard {
    let data = FifaData::new(
        Arc::new(api),
        Arc::new(MemoryCache::new()),
        TournamentIds::default(),
    );
    Dashboard::new(
        data,
        500,
        temp_path("no_colors.db"),
        temp_path("no_injuries.csv"),
    )
}

#[test]
fn anonymous_session_is_redirected() {
    let dash = dashboard(full_api());
    let anon = Session::anonymous();
    assert!(matches!(dash.performance_page(&anon), PageAccess::RedirectToLogin));
    assert!(matches!(
        dash.medical_page(&anon, &InjuryFilter::default()),
        PageAccess::RedirectToLogin
    ));
}

#[test]
fn performance_page_builds_sorted_catalog_and_filters() {
    let dash = dashboard(full_api());
    let page = dash
        .performance_page(&Session::authenticated("coach"))
        .granted()
        .expect("authenticated");

    assert!(!page.is_empty());
    assert_eq!(page.catalog[0].match_id, "300002");
    assert_eq!(page.min_date.to_string(), "2024-09-14");
    assert_eq!(page.max_date.to_string(), "2024-10-06");
    assert!(page.teams.contains(&"Brazil".to_string()));

    let options = page.options(&DateRange::unbounded(), Some("Brazil"));
    assert_eq!(options.len(), 2);
    assert_eq!(
        page.reconcile(&options, Some("300004")),
        SelectionUpdate::Select("300004".to_string())
    );
    assert_eq!(page.reconcile(&options, Some("300002")), SelectionUpdate::NoChange);
}

#[test]
fn failed_catalog_fetch_is_the_no_matches_state() {
    let dash = dashboard(FakeApi::new());
    let page = dash
        .performance_page(&Session::authenticated("coach"))
        .granted()
        .expect("authenticated");
    assert!(page.is_empty());
    assert!(page.options(&DateRange::unbounded(), None).is_empty());
}

#[test]
fn match_detail_joins_events_squads_and_colors() {
    let dash = dashboard(full_api());
    let page = dash
        .performance_page(&Session::authenticated("coach"))
        .granted()
        .expect("authenticated");

    let detail = dash
        .match_detail(&page.catalog, "300001")
        .expect("match in catalog");
    assert_eq!(
        detail.title,
        "Attacking Events per minute - Brazil vs IR Iran (2024-09-15)"
    );
    assert_eq!(detail.events.len(), 5);
    assert_eq!(detail.table.len(), 5);
    assert_eq!(detail.table[0].player_name, "Pito");
    assert_eq!(detail.colors[0].team_name, "Brazil");
    assert_eq!(detail.colors[0].color, DEFAULT_PRIMARY);
    assert_eq!(detail.colors[1].color, DEFAULT_SECONDARY);
    assert!(!detail.distribution.is_empty());
    assert!(!detail.timeline.is_empty());
}

#[test]
fn match_detail_for_unknown_id_is_none() {
    let dash = dashboard(full_api());
    let page = dash
        .performance_page(&Session::authenticated("coach"))
        .granted()
        .expect("authenticated");
    assert!(dash.match_detail(&page.catalog, "nope").is_none());
    assert!(dash.match_detail(&page.catalog, "").is_none());
}

#[test]
fn match_without_timeline_is_an_empty_view() {
    let dash = dashboard(full_api());
    let page = dash
        .performance_page(&Session::authenticated("coach"))
        .granted()
        .expect("authenticated");
    let detail = dash
        .match_detail(&page.catalog, "300004")
        .expect("match in catalog");
    assert!(detail.events.is_empty());
    assert!(detail.table.is_empty());
}

#[test]
fn medical_page_uses_synthetic_log_when_absent() {
    let dash = dashboard(full_api());
    let filter = InjuryFilter {
        kind: Some("Muscle".to_string()),
        ..InjuryFilter::default()
    };
    let page = dash
        .medical_page(&Session::authenticated("physio"), &filter)
        .granted()
        .expect("authenticated");
    assert_eq!(page.table.len(), 10);
    assert_eq!(page.players.len(), 8);
    assert_eq!(page.types.len(), 4);
    assert_eq!(page.by_type_severity.len(), 1);
    assert_eq!(page.min_date.map(|d| d.to_string()).as_deref(), Some("2024-08-01"));
}
