mod common;

use rusqlite::{Connection, params};

use common::temp_path;
use futsal_pulse::team_colors::{
    ColorStore, DEFAULT_PRIMARY, DEFAULT_SECONDARY, TeamColorEntry, parse_hex, pick_colors,
    rgb_distance, too_similar,
};

fn store() -> ColorStore {
    ColorStore::new(vec![
        TeamColorEntry::new("Brazil", "BRA", "#ffdc02", "#0033a0"),
        TeamColorEntry::new("Argentina", "ARG", "#75aadb", "#1c2a48"),
        TeamColorEntry::new("Colombia", "COL", "#fcd116", "#d52b1e"),
        TeamColorEntry::new(" Spain ", "esp", "#c60b1e", "#ffc400"),
    ])
}

#[test]
fn distinct_primaries_are_kept() {
    let (home, away) = pick_colors("Brazil", "Argentina", &store());
    assert_eq!(home, "#ffdc02");
    assert_eq!(away, "#75aadb");
}

#[test]
fn clashing_primaries_switch_second_team_to_secondary() {
    // #ffdc02 vs #fcd116: 3 + 11 + 20 = 34
    let (home, away) = pick_colors("Brazil", "Colombia", &store());
    assert_eq!(home, "#ffdc02");
    assert_eq!(away, "#d52b1e");
}

#[test]
fn same_team_twice_uses_secondary_for_second_slot() {
    let (home, away) = pick_colors("Argentina", "Argentina", &store());
    assert_eq!(home, "#75aadb");
    assert_eq!(away, "#1c2a48");
    assert_ne!(home, away);
}

#[test]
fn lookup_is_case_and_whitespace_insensitive() {
    let s = store();
    assert!(s.find("  bRaZiL ").is_some());
    assert_eq!(s.find("spain").map(|e| e.key_abbr.as_str()), Some("ESP"));
    let (home, _) = pick_colors("SPAIN", "Brazil", &s);
    assert_eq!(home, "#c60b1e");
}

#[test]
fn absent_teams_use_default_palette_without_looping() {
    let (home, away) = pick_colors("Atlantis", "Lemuria", &store());
    assert_eq!(home, DEFAULT_PRIMARY);
    assert_eq!(away, DEFAULT_SECONDARY);
    let a = parse_hex(&home).expect("hex");
    let b = parse_hex(&away).expect("hex");
    assert!(rgb_distance(a, b) >= 90);
}

#[test]
fn empty_store_uses_default_palette() {
    let (home, away) = pick_colors("Brazil", "Argentina", &ColorStore::default());
    assert_eq!((home.as_str(), away.as_str()), (DEFAULT_PRIMARY, DEFAULT_SECONDARY));
}

#[test]
fn secondary_is_not_rechecked() {
    let s = ColorStore::new(vec![
        TeamColorEntry::new("Home", "HOM", "#101010", "#ffffff"),
        TeamColorEntry::new("Away", "AWY", "#121212", "#111111"),
    ]);
    let (home, away) = pick_colors("Home", "Away", &s);
    assert_eq!(home, "#101010");
    assert_eq!(away, "#111111");
    assert!(too_similar(&home, &away));
}

#[test]
fn threshold_is_strictly_below_ninety() {
    assert!(too_similar("#000000", "#000059"));
    assert!(!too_similar("#000000", "#00005a"));
}

#[test]
fn missing_db_file_loads_empty_store() {
    let path = temp_path("does_not_exist.db");
    let store = ColorStore::load(&path).expect("absent db is not an error");
    assert!(store.is_empty());
}

#[test]
fn loads_team_colors_table() {
    let path = temp_path("team_colors.db");
    {
        let conn = Connection::open(&path).expect("create db");
        conn.execute_batch(
            "CREATE TABLE team_colors (name TEXT, abbr TEXT, home_color TEXT, away_color TEXT);",
        )
        .expect("schema");
        conn.execute(
            "INSERT INTO team_colors (name, abbr, home_color, away_color) VALUES (?1, ?2, ?3, ?4)",
            params!["Portugal ", "por", "#da291c", "#046a38"],
        )
        .expect("insert");
        conn.execute(
            "INSERT INTO team_colors (name, abbr, home_color, away_color) VALUES (?1, NULL, ?2, ?3)",
            params!["Morocco", "#c1272d", "#006233"],
        )
        .expect("insert");
    }

    let store = ColorStore::load(&path).expect("load colors");
    assert_eq!(store.len(), 2);
    let portugal = store.find("PORTUGAL").expect("portugal present");
    assert_eq!(portugal.key_name, "PORTUGAL");
    assert_eq!(portugal.key_abbr, "POR");
    assert_eq!(portugal.home_color, "#da291c");
    let morocco = store.find("morocco").expect("morocco present");
    assert_eq!(morocco.abbr, "");

    let (home, away) = pick_colors("Portugal", "Morocco", &store);
    assert_eq!((home.as_str(), away.as_str()), ("#da291c", "#006233"));

    let _ = std::fs::remove_file(&path);
}
