#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use futsal_pulse::catalog::Match;
use futsal_pulse::http_client::{FetchError, TournamentApi};

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

pub fn fixture_json(name: &str) -> Value {
    serde_json::from_str(&read_fixture(name)).expect("fixture should be valid json")
}

pub fn temp_path(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("futsal_pulse_{}_{nanos}_{name}", std::process::id()))
}

/// Answers from canned JSON per path and counts every call.
#[derive(Default)]
pub struct FakeApi {
    routes: HashMap<String, Value>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, body: Value) -> Self {
        self.routes.insert(path.to_string(), body);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.seen.lock().expect("lock").clone()
    }
}

impl TournamentApi for FakeApi {
    fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("lock").push((
            path.to_string(),
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ));
        self.routes
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: path.to_string(),
                status: 404,
            })
    }
}

pub fn sample_match(id: &str, group: &str, stage: &str, kickoff: &str, home: &str, away: &str) -> Match {
    Match {
        match_id: id.to_string(),
        stage_name: stage.to_string(),
        group_name: group.to_string(),
        home_id: format!("{id}-h"),
        home_name: home.to_string(),
        away_id: format!("{id}-a"),
        away_name: away.to_string(),
        kickoff_date: kickoff.to_string(),
        match_name: format!("{home} vs {away}"),
        kickoff_date_only: None,
    }
}
