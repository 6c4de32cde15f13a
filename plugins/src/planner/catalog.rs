//! Character catalog served by a genshin.dev compatible API.

use serde::Deserialize;
use serde_json::Value;

use pagestate_core::adapter::{RemoteCatalog, RemoteRequest};
use pagestate_core::state::Filters;

use super::model::{slug, Character, CharacterFilter};

#[derive(Debug, Clone, Default)]
pub struct GenshinCatalog;

#[derive(Debug, Deserialize)]
struct RawCharacter {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    vision: String,
    #[serde(default)]
    weapon: String,
    #[serde(default)]
    rarity: u8,
}

impl From<RawCharacter> for Character {
    fn from(raw: RawCharacter) -> Self {
        Character {
            id: raw.id.unwrap_or_else(|| slug(&raw.name)),
            name: raw.name,
            element: raw.vision,
            weapon: raw.weapon,
            rarity: raw.rarity,
        }
    }
}

impl RemoteCatalog for GenshinCatalog {
    type Entity = Character;

    fn name(&self) -> &str {
        "genshin"
    }

    /// The API has no search; the full roster is fetched once and refined
    /// locally, so every query maps to the same cached request.
    fn search_request(&self, _query: &str, _filters: &Filters<CharacterFilter>) -> RemoteRequest {
        RemoteRequest::new("/characters/all").param("lang", "en")
    }

    fn by_id_request(&self, id: &String) -> RemoteRequest {
        RemoteRequest::new(format!("/characters/{id}")).param("lang", "en")
    }

    fn parse_search(&self, body: &Value) -> Result<Vec<Character>, String> {
        let raw: Vec<Value> = body
            .as_array()
            .cloned()
            .ok_or_else(|| "expected a character array".to_string())?;
        // Unreleased entries come back without a name; skip them.
        Ok(raw
            .into_iter()
            .filter_map(|v| serde_json::from_value::<RawCharacter>(v).ok())
            .map(Character::from)
            .collect())
    }

    fn parse_one(&self, body: &Value) -> Result<Option<Character>, String> {
        serde_json::from_value::<RawCharacter>(body.clone())
            .map(|raw| Some(raw.into()))
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pagestate_core::adapter::{DataSource, HttpSource, RateLimiter};
    use pagestate_core::clock::ManualClock;
    use pagestate_core::error::FetchError;
    use std::sync::Arc;

    const ROSTER: &str = r#"[
        {"id": "hu-tao", "name": "Hu Tao", "vision": "Pyro", "weapon": "Polearm", "rarity": 5},
        {"name": "Xiangling", "vision": "Pyro", "weapon": "Polearm", "rarity": 4},
        {"name": "Fischl", "vision": "Electro", "weapon": "Bow", "rarity": 4},
        {"vision": "Anemo"}
    ]"#;

    #[test]
    fn parse_roster_derives_missing_ids() {
        let body: Value = serde_json::from_str(ROSTER).unwrap();
        let roster = GenshinCatalog.parse_search(&body).unwrap();
        let ids: Vec<&str> = roster.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["hu-tao", "xiangling", "fischl"]);
        assert!(GenshinCatalog.parse_search(&serde_json::json!({})).is_err());
    }

    #[tokio::test]
    async fn every_query_reuses_the_cached_roster() {
        let mut server = mockito::Server::new_async().await;
        let roster = server
            .mock("GET", "/characters/all")
            .match_query(mockito::Matcher::UrlEncoded("lang".into(), "en".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ROSTER)
            .expect(1)
            .create_async()
            .await;

        let source = HttpSource::new(GenshinCatalog, &server.url(), 2_000).unwrap();
        let all = source.search("", &Filters::new()).await.unwrap();
        assert_eq!(all.len(), 3);

        let mut filters = Filters::new();
        filters.insert(CharacterFilter::Element, "electro".to_string());
        let electro = source.search("", &filters).await.unwrap();
        assert_eq!(electro.len(), 1);
        assert_eq!(electro[0].name, "Fischl");

        let hits = source.search("tao", &Filters::new()).await.unwrap();
        assert_eq!(hits.len(), 1);
        roster.assert_async().await;
    }

    #[tokio::test]
    async fn exhausted_budget_fails_fast() {
        let mut server = mockito::Server::new_async().await;
        let _one = server
            .mock("GET", "/characters/fischl")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("x-ratelimit-remaining", "0")
            .with_body(r#"{"name": "Fischl", "vision": "Electro", "weapon": "Bow", "rarity": 4}"#)
            .create_async()
            .await;
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let limiter = RateLimiter::new(10, chrono::Duration::seconds(60), clock.clone());
        let source = HttpSource::new(GenshinCatalog, &server.url(), 2_000)
            .unwrap()
            .with_rate_limit(limiter);

        let fischl = source.get_by_id(&"fischl".to_string()).await.unwrap();
        assert_eq!(fischl.map(|c| c.rarity), Some(4));
        let err = source.get_by_id(&"xiangling".to_string()).await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited { .. }));

        clock.advance(chrono::Duration::seconds(61));
        assert!(source.rate_limiter().unwrap().acquire().is_ok());
    }
}
