//! Natural-language route explanations via the Gemini API.
//!
//! Infallible by design: without an API key, on any HTTP failure or when
//! the model returns something unparseable, a deterministic comparison
//! template is used instead. Responses are cached for ten minutes keyed
//! by the exact payload.

use dashmap::DashMap;
use frostbyte_core::Candidate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const CACHE_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
    pub bullets: Vec<String>,
    pub comfort_score: Option<f64>,
}

pub struct GeminiExplainer {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    cache: DashMap<String, (Instant, Explanation)>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ModelCandidate>,
}

#[derive(Debug, Deserialize)]
struct ModelCandidate {
    content: Option<ModelContent>,
}

#[derive(Debug, Deserialize)]
struct ModelContent {
    #[serde(default)]
    parts: Vec<ModelPart>,
}

#[derive(Debug, Deserialize)]
struct ModelPart {
    #[serde(default)]
    text: String,
}

impl GeminiExplainer {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            cache: DashMap::new(),
        }
    }

    /// Explain why `chosen_id` was picked over the other candidates.
    pub async fn explain(&self, chosen_id: &str, candidates: &[Candidate]) -> Explanation {
        let payload = explanation_payload(chosen_id, candidates);
        let fallback = fallback_explanation(chosen_id, candidates);

        let Some(api_key) = self.api_key.as_deref() else {
            return fallback;
        };

        let cache_key = payload.to_string();
        if let Some(entry) = self.cache.get(&cache_key) {
            let (cached_at, explanation) = entry.value();
            if cached_at.elapsed() < CACHE_TTL {
                return explanation.clone();
            }
        }

        let explanation = match self.generate(api_key, &payload).await {
            Ok(Some(explanation)) => explanation,
            Ok(None) => fallback,
            Err(err) => {
                tracing::warn!("explanation generation failed, using template: {}", err);
                fallback
            }
        };

        self.prune_expired();
        self.cache
            .insert(cache_key, (Instant::now(), explanation.clone()));
        explanation
    }

    /// Drop entries past the TTL so the map stays bounded.
    fn prune_expired(&self) {
        self.cache
            .retain(|_, (cached_at, _)| cached_at.elapsed() < CACHE_TTL);
    }

    async fn generate(
        &self,
        api_key: &str,
        payload: &serde_json::Value,
    ) -> Result<Option<Explanation>, reqwest::Error> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, GEMINI_MODEL
        );
        let body = json!({
            "contents": [{"parts": [{"text": build_prompt(payload)}]}],
        });

        let response: GenerateContentResponse = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .unwrap_or_default();

        Ok(extract_json(&text))
    }
}

fn explanation_payload(chosen_id: &str, candidates: &[Candidate]) -> serde_json::Value {
    json!({
        "chosen_route_id": chosen_id,
        "routes": candidates
            .iter()
            .map(|c| json!({"id": c.id, "metrics": c.metrics, "total_score": c.total_score}))
            .collect::<Vec<_>>(),
    })
}

fn build_prompt(payload: &serde_json::Value) -> String {
    format!(
        "You are explaining a winter walking route choice for a navigation app.\n\
         Rules:\n\
         - Do NOT invent street names or locations\n\
         - Use only the data provided\n\
         - Mention tradeoffs (distance vs. wind/snow)\n\
         - Output JSON ONLY with keys: explanation, bullets, comfort_score\n\n\
         DATA: {payload:#}"
    )
}

/// Pull the first JSON object out of a model reply that may wrap it in
/// prose or code fences.
fn extract_json(text: &str) -> Option<Explanation> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(text.get(start..=end)?).ok()
}

/// Deterministic comparison of the chosen route against the best other
/// candidate, used whenever the model is unavailable.
fn fallback_explanation(chosen_id: &str, candidates: &[Candidate]) -> Explanation {
    let chosen = candidates.iter().find(|c| c.id == chosen_id);
    let other = candidates.iter().find(|c| c.id != chosen_id);

    let (Some(chosen), Some(other)) = (chosen, other) else {
        return Explanation {
            explanation:
                "This route was selected because it appears more comfortable based on weather conditions."
                    .to_string(),
            bullets: vec![
                "Comfort-based routing".to_string(),
                "Lower wind exposure".to_string(),
            ],
            comfort_score: None,
        };
    };

    Explanation {
        explanation: "This route is slightly longer, but offers better shelter from buildings, \
                      reduces wind in your face (and general wind exposure), overall improving \
                      your walking comfort."
            .to_string(),
        bullets: vec![
            format!(
                "Distance: {:.0} m vs {:.0} m",
                chosen.metrics.distance_m, other.metrics.distance_m
            ),
            format!(
                "Wind cost: {:.1} vs {:.1}",
                chosen.metrics.wind_cost, other.metrics.wind_cost
            ),
            format!(
                "Snow cost: {:.1} vs {:.1}",
                chosen.metrics.snow_cost, other.metrics.snow_cost
            ),
        ],
        comfort_score: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frostbyte_core::{RouteKind, RouteMetrics};

    fn candidate(id: &str, distance_m: f64, wind_cost: f64, snow_cost: f64) -> Candidate {
        Candidate {
            id: id.to_string(),
            kind: RouteKind::Comfort,
            geometry: Vec::new(),
            distance_m,
            duration_s: 0.0,
            metrics: RouteMetrics {
                distance_m,
                wind_cost,
                snow_cost,
            },
            total_score: 0.0,
        }
    }

    #[test]
    fn extracts_json_from_fenced_reply() {
        let reply = "Here you go:\n```json\n{\"explanation\": \"calmer\", \"bullets\": [\"a\"], \"comfort_score\": 0.8}\n```";
        let parsed = extract_json(reply).unwrap();
        assert_eq!(parsed.explanation, "calmer");
        assert_eq!(parsed.comfort_score, Some(0.8));
    }

    #[test]
    fn garbage_reply_yields_none() {
        assert!(extract_json("no json here").is_none());
        assert!(extract_json("{not valid json}").is_none());
    }

    #[test]
    fn fallback_compares_chosen_against_other() {
        let candidates = vec![
            candidate("route_0", 1300.0, 200.0, 90.0),
            candidate("route_1", 1450.0, 120.0, 40.0),
        ];
        let explanation = fallback_explanation("route_1", &candidates);

        assert_eq!(explanation.bullets.len(), 3);
        assert!(explanation.bullets[0].contains("1450"));
        assert!(explanation.bullets[0].contains("1300"));
        assert!(explanation.comfort_score.is_none());
    }

    #[test]
    fn fallback_with_single_candidate_is_generic() {
        let candidates = vec![candidate("route_0", 900.0, 10.0, 5.0)];
        let explanation = fallback_explanation("route_0", &candidates);
        assert_eq!(explanation.bullets.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn inserting_prunes_expired_entries() {
        let explainer = GeminiExplainer::new(DEFAULT_GEMINI_URL, None);
        let canned = Explanation {
            explanation: "calmer".to_string(),
            bullets: Vec::new(),
            comfort_score: None,
        };

        explainer
            .cache
            .insert("stale".to_string(), (Instant::now(), canned.clone()));
        tokio::time::advance(CACHE_TTL + Duration::from_secs(1)).await;

        explainer
            .cache
            .insert("fresh".to_string(), (Instant::now(), canned));
        explainer.prune_expired();

        assert!(!explainer.cache.contains_key("stale"));
        assert!(explainer.cache.contains_key("fresh"));
    }

    #[tokio::test]
    async fn missing_api_key_uses_template() {
        let explainer = GeminiExplainer::new(DEFAULT_GEMINI_URL, None);
        let candidates = vec![
            candidate("route_0", 1300.0, 200.0, 90.0),
            candidate("route_1", 1450.0, 120.0, 40.0),
        ];
        let explanation = explainer.explain("route_1", &candidates).await;
        assert!(!explanation.explanation.is_empty());
    }
}
