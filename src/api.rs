use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::model::{Food, Inventory, Maturity, SleepKind, Stats, WashKind};

/// Thin typed client over the pet server's JSON endpoints. No retries;
/// the last response wins.
#[derive(Clone)]
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsResponse {
    pub(crate) success: bool,
    pub(crate) stats: Stats,
    #[serde(default)]
    pub(crate) inventory: Option<Inventory>,
    #[serde(default)]
    pub(crate) is_sleeping: bool,
    #[serde(default)]
    pub(crate) sleep_type: Option<SleepKind>,
    #[serde(default)]
    pub(crate) sleep_end_time: Option<String>,
    #[serde(default)]
    pub(crate) sleep_start_time: Option<String>,
    #[serde(default)]
    pub(crate) is_washing: bool,
    #[serde(default)]
    pub(crate) wash_type: Option<WashKind>,
    #[serde(default)]
    pub(crate) wash_end_time: Option<String>,
    #[serde(default)]
    pub(crate) wash_start_time: Option<String>,
    #[serde(default)]
    pub(crate) maturity: Option<Maturity>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionResponse {
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) stats: Option<Stats>,
    #[serde(default)]
    pub(crate) inventory: Option<Inventory>,
    #[serde(default)]
    pub(crate) is_sleeping: Option<bool>,
    #[serde(default)]
    pub(crate) sleep_end_time: Option<String>,
    #[serde(default)]
    pub(crate) is_washing: Option<bool>,
    #[serde(default)]
    pub(crate) wash_end_time: Option<String>,
    #[serde(default)]
    pub(crate) maturity: Option<Maturity>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PurchaseResponse {
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) inventory: Option<Inventory>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HigherLowerResponse {
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) rolled_number: Option<i64>,
    #[serde(default)]
    pub(crate) is_correct: Option<bool>,
    #[serde(default)]
    pub(crate) reward_message: Option<String>,
    #[serde(default)]
    pub(crate) stats: Option<Stats>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabyrinthResponse {
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) reward_message: Option<String>,
    #[serde(default)]
    pub(crate) inventory: Option<Inventory>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MaturityResponse {
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) maturity: Option<Maturity>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

/// Subtype that rides along with a `POST /api/pet/action`, named by its
/// wire field.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ActionBody {
    Feed(Food),
    Play(crate::model::PlayKind),
    Wash(WashKind),
    Sleep(SleepKind),
}

impl ActionBody {
    fn to_json(self) -> serde_json::Value {
        match self {
            ActionBody::Feed(f) => json!({ "action": "feed", "food_type": f.wire_name() }),
            ActionBody::Play(p) => json!({ "action": "play", "play_type": p.wire_name() }),
            ActionBody::Wash(w) => json!({ "action": "wash", "wash_type": w.wire_name() }),
            ActionBody::Sleep(s) => json!({ "action": "sleep", "sleep_type": s.wire_name() }),
        }
    }
}

impl ApiClient {
    pub(crate) fn new(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub(crate) async fn fetch_stats(&self) -> Result<StatsResponse> {
        let resp = self
            .http
            .get(self.url("/api/pet/stats"))
            .send()
            .await
            .context("stats request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("stats HTTP {}", resp.status()));
        }
        let body: StatsResponse = resp.json().await.context("stats JSON parse failed")?;
        if !body.success {
            return Err(anyhow!(server_error(&body.error)));
        }
        Ok(body)
    }

    pub(crate) async fn pet_action(&self, body: ActionBody) -> Result<ActionResponse> {
        let resp = self
            .http
            .post(self.url("/api/pet/action"))
            .json(&body.to_json())
            .send()
            .await
            .context("action request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("action HTTP {}", resp.status()));
        }
        let body: ActionResponse = resp.json().await.context("action JSON parse failed")?;
        if !body.success {
            return Err(anyhow!(server_error(&body.error)));
        }
        Ok(body)
    }

    pub(crate) async fn test_action(&self, test_action: &str) -> Result<ActionResponse> {
        let resp = self
            .http
            .post(self.url("/api/pet/test-action"))
            .json(&json!({ "test_action": test_action }))
            .send()
            .await
            .context("test-action request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("test-action HTTP {}", resp.status()));
        }
        let body: ActionResponse = resp.json().await.context("test-action JSON parse failed")?;
        if !body.success {
            return Err(anyhow!(server_error(&body.error)));
        }
        Ok(body)
    }

    pub(crate) async fn purchase(&self, food: Food, quantity: u32) -> Result<PurchaseResponse> {
        let resp = self
            .http
            .post(self.url("/api/shop/purchase"))
            .json(&json!({ "food_type": food.wire_name(), "quantity": quantity }))
            .send()
            .await
            .context("purchase request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("purchase HTTP {}", resp.status()));
        }
        let body: PurchaseResponse = resp.json().await.context("purchase JSON parse failed")?;
        if !body.success {
            return Err(anyhow!(server_error(&body.error)));
        }
        Ok(body)
    }

    pub(crate) async fn higher_lower(&self, guess: &str) -> Result<HigherLowerResponse> {
        let resp = self
            .http
            .post(self.url("/api/minigame/higher-lower"))
            .json(&json!({ "guess": guess }))
            .send()
            .await
            .context("higher-lower request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("higher-lower HTTP {}", resp.status()));
        }
        let body: HigherLowerResponse =
            resp.json().await.context("higher-lower JSON parse failed")?;
        if !body.success {
            return Err(anyhow!(server_error(&body.error)));
        }
        Ok(body)
    }

    pub(crate) async fn labyrinth_result(
        &self,
        blueberry: u32,
        acorn: u32,
    ) -> Result<LabyrinthResponse> {
        let resp = self
            .http
            .post(self.url("/api/minigame/labyrinth"))
            .json(&json!({ "collected": { "blueberry": blueberry, "acorn": acorn } }))
            .send()
            .await
            .context("labyrinth request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("labyrinth HTTP {}", resp.status()));
        }
        let body: LabyrinthResponse = resp.json().await.context("labyrinth JSON parse failed")?;
        if !body.success {
            return Err(anyhow!(server_error(&body.error)));
        }
        Ok(body)
    }

    pub(crate) async fn maturity_shift(&self, direction: &str) -> Result<MaturityResponse> {
        let resp = self
            .http
            .post(self.url("/api/pet/maturity"))
            .json(&json!({ "action": direction }))
            .send()
            .await
            .context("maturity request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("maturity HTTP {}", resp.status()));
        }
        let body: MaturityResponse = resp.json().await.context("maturity JSON parse failed")?;
        if !body.success {
            return Err(anyhow!(server_error(&body.error)));
        }
        Ok(body)
    }
}

fn server_error(error: &Option<String>) -> String {
    error
        .clone()
        .unwrap_or_else(|| "server refused the request".to_string())
}

/// Server timestamps arrive as strings in whatever shape the framework's
/// JSON encoder picked; accept both RFC 3339 and RFC 2822.
pub(crate) fn parse_server_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(s) {
        return Some(t.with_timezone(&Utc));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaturityStage;

    #[test]
    fn stats_response_full_fixture() {
        let body = r#"{
            "success": true,
            "stats": {"hunger": 72.5, "happiness": 90.0, "cleanliness": 41.2, "energy": 12.0},
            "inventory": {"tree_seed": 5, "blueberries": 2, "mushroom": 0, "acorn": 1, "coins": 104},
            "is_sleeping": true,
            "sleep_type": "nap",
            "sleep_start_time": "2026-08-07T10:00:00Z",
            "sleep_end_time": "2026-08-07T10:01:00Z",
            "is_washing": false,
            "wash_type": null,
            "wash_end_time": null,
            "wash_start_time": null,
            "maturity": {"stage": "teen", "next_change_time": "2026-08-08T10:00:00Z"}
        }"#;
        let r: StatsResponse = serde_json::from_str(body).unwrap();
        assert!(r.success);
        assert_eq!(r.stats.hunger, 72.5);
        assert_eq!(r.inventory.unwrap().coins, 104);
        assert!(r.is_sleeping);
        assert_eq!(r.sleep_type, Some(SleepKind::Nap));
        assert_eq!(r.maturity.unwrap().stage, MaturityStage::Teen);
    }

    #[test]
    fn stats_response_minimal_fixture() {
        // early server revisions only send success + stats
        let body = r#"{
            "success": true,
            "stats": {"hunger": 50, "happiness": 50, "cleanliness": 50, "energy": 50}
        }"#;
        let r: StatsResponse = serde_json::from_str(body).unwrap();
        assert!(!r.is_sleeping);
        assert!(!r.is_washing);
        assert!(r.inventory.is_none());
        assert!(r.maturity.is_none());
    }

    #[test]
    fn action_response_fixture() {
        let body = r#"{
            "success": true,
            "stats": {"hunger": 75.0, "happiness": 50.0, "cleanliness": 50.0, "energy": 50.0},
            "inventory": {"tree_seed": 4, "blueberries": 2, "mushroom": 0, "acorn": 1, "coins": 104}
        }"#;
        let r: ActionResponse = serde_json::from_str(body).unwrap();
        assert!(r.success);
        assert_eq!(r.stats.unwrap().hunger, 75.0);
        assert!(r.sleep_end_time.is_none());
    }

    #[test]
    fn failed_action_carries_error_text() {
        let body = r#"{ "success": false, "error": "Not enough tree_seed" }"#;
        let r: ActionResponse = serde_json::from_str(body).unwrap();
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("Not enough tree_seed"));
    }

    #[test]
    fn higher_lower_response_fixture() {
        let body = r#"{
            "success": true,
            "rolled_number": 17,
            "is_correct": true,
            "reward_message": "You won 2 coins!",
            "stats": {"hunger": 50, "happiness": 52, "cleanliness": 50, "energy": 50}
        }"#;
        let r: HigherLowerResponse = serde_json::from_str(body).unwrap();
        assert_eq!(r.rolled_number, Some(17));
        assert_eq!(r.is_correct, Some(true));
    }

    #[test]
    fn action_bodies_use_wire_field_names() {
        let v = ActionBody::Feed(Food::Blueberries).to_json();
        assert_eq!(v["action"], "feed");
        assert_eq!(v["food_type"], "blueberries");

        let v = ActionBody::Sleep(SleepKind::Nap).to_json();
        assert_eq!(v["sleep_type"], "nap");

        let v = ActionBody::Wash(WashKind::WashHands).to_json();
        assert_eq!(v["wash_type"], "wash_hands");

        let v = ActionBody::Play(crate::model::PlayKind::SpinInWheel).to_json();
        assert_eq!(v["play_type"], "spin_in_wheel");
    }

    #[test]
    fn server_time_accepts_both_common_formats() {
        assert!(parse_server_time("2026-08-07T10:01:00Z").is_some());
        assert!(parse_server_time("2026-08-07T10:01:00+02:00").is_some());
        assert!(parse_server_time("Fri, 07 Aug 2026 10:01:00 GMT").is_some());
        assert!(parse_server_time("not a time").is_none());
    }
}
