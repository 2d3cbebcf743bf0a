use std::sync::Arc;

use crate::catalog::{Match, normalize_matches};
use crate::config::TournamentIds;
use crate::events::{Event, Player, parse_squad, parse_timeline};
use crate::http_client::{FetchError, TournamentApi};
use crate::result_cache::{
    Cache, EVENTS_TTL, MATCHES_TTL, SQUADS_TTL, fingerprint, lookup, memoize, store,
};

/// Cached tournament queries.
///
/// Remote failures degrade to an empty result here and are never cached, so
/// the next request retries. Callers must treat empty as "nothing to show"
/// rather than as proof the fetch succeeded.
#[derive(Clone)]
pub struct FifaData {
    api: Arc<dyn TournamentApi>,
    cache: Arc<dyn Cache>,
    ids: TournamentIds,
}

impl FifaData {
    pub fn new(api: Arc<dyn TournamentApi>, cache: Arc<dyn Cache>, ids: TournamentIds) -> Self {
        Self { api, cache, ids }
    }

    pub fn ids(&self) -> &TournamentIds {
        &self.ids
    }

    pub fn matches(&self, season_id: &str, count: u32) -> Vec<Match> {
        let count = count.to_string();
        let key = fingerprint("matches", &[season_id, count.as_str()]);
        let fetched = memoize(self.cache.as_ref(), &key, MATCHES_TTL, || {
            let raw = self.api.get_json(
                "/calendar/matches",
                &[("idSeason", season_id.to_string()), ("count", count.clone())],
            )?;
            Ok::<_, FetchError>(normalize_matches(&raw))
        });
        degrade("matches", fetched)
    }

    pub fn season_matches(&self, count: u32) -> Vec<Match> {
        self.matches(&self.ids.season_id, count)
    }

    pub fn match_events(
        &self,
        match_id: &str,
        competition_id: &str,
        season_id: &str,
        stage_id: &str,
    ) -> Vec<Event> {
        let key = fingerprint("events", &[competition_id, season_id, stage_id, match_id]);
        let fetched = memoize(self.cache.as_ref(), &key, EVENTS_TTL, || {
            let path = format!("/timelines/{competition_id}/{season_id}/{stage_id}/{match_id}");
            let raw = self.api.get_json(&path, &[])?;
            Ok::<_, FetchError>(parse_timeline(&raw))
        });
        degrade("events", fetched)
    }

    pub fn events_for(&self, match_id: &str) -> Vec<Event> {
        let ids = &self.ids;
        self.match_events(match_id, &ids.competition_id, &ids.season_id, &ids.stage_id)
    }

    /// Players of every listed team. A team whose squad request fails is
    /// skipped; the combined result is cached only when every team answered.
    pub fn squads(&self, team_ids: &[String], competition_id: &str, season_id: &str) -> Vec<Player> {
        let mut args: Vec<&str> = vec![competition_id, season_id];
        args.extend(team_ids.iter().map(String::as_str));
        let key = fingerprint("squads", &args);
        if let Some(hit) = lookup::<Vec<Player>>(self.cache.as_ref(), &key) {
            return hit;
        }

        let mut rows = Vec::new();
        let mut failures = 0usize;
        for team_id in team_ids {
            let path = format!("/teams/{team_id}/squad");
            let params = [
                ("idCompetition", competition_id.to_string()),
                ("idSeason", season_id.to_string()),
            ];
            match self.api.get_json(&path, &params) {
                Ok(raw) => rows.extend(parse_squad(&raw)),
                Err(err) => {
                    failures += 1;
                    tracing::warn!(team_id = %team_id, %err, "squad fetch failed, skipping team");
                }
            }
        }
        if failures == 0 {
            store(self.cache.as_ref(), &key, &rows, SQUADS_TTL);
        }
        rows
    }

    pub fn squads_for(&self, team_ids: &[String]) -> Vec<Player> {
        self.squads(team_ids, &self.ids.competition_id, &self.ids.season_id)
    }
}

fn degrade<T>(query: &str, fetched: Result<Vec<T>, FetchError>) -> Vec<T> {
    match fetched {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(query, %err, "remote fetch failed, returning empty result");
            Vec::new()
        }
    }
}
