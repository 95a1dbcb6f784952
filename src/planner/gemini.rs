//! Gemini-backed planner.
//!
//! Sends the coaching prompt to the `generateContent` endpoint with a JSON
//! response schema, then parses the returned text into a [`WorkoutPlan`].

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use super::{AdjustmentError, GenerationError, PlanService, PlannerError, prompt, schema};
use crate::model::{OnboardingData, SessionLog, WorkoutPlan};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

// ── Wire types ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ── Planner ──

/// Plans workouts with a Gemini model.
pub struct GeminiPlanner {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiPlanner {
    /// Creates a planner whose requests give up after `timeout`.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, PlannerError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Sends one prompt and returns the model's text answer.
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate_content(&self, prompt: String) -> Result<String, PlannerError> {
        if self.api_key.is_empty() {
            return Err(PlannerError::MissingApiKey);
        }
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema::workout_plan(),
            },
        };

        debug!("sending request to Gemini");
        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(request_failed)?;
        let status = response.status();
        let body = response.text().await.map_err(request_failed)?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            let message = serde_json::from_str::<GenerateResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map_or(body, |e| e.message);
            return Err(PlannerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            PlannerError::MalformedResponse(format!("unexpected response envelope: {e}"))
        })?;
        if let Some(err) = parsed.error {
            return Err(PlannerError::Api {
                status: status.as_u16(),
                message: err.message,
            });
        }

        parsed
            .candidates
            .into_iter()
            .flatten()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| PlannerError::MalformedResponse("no text in response".to_string()))
    }
}

// Transport errors carry the request URL; keep it out of messages and logs.
fn request_failed(e: reqwest::Error) -> PlannerError {
    PlannerError::Request(e.without_url())
}

#[async_trait]
impl PlanService for GeminiPlanner {
    async fn generate_plan(&self, data: &OnboardingData) -> Result<WorkoutPlan, GenerationError> {
        let text = self.generate_content(prompt::generation(data)).await?;
        Ok(parse_plan(&text, true)?)
    }

    async fn adjust_plan(
        &self,
        current: &WorkoutPlan,
        recent: &[SessionLog],
    ) -> Result<WorkoutPlan, AdjustmentError> {
        let prompt = prompt::adjustment(current, recent)
            .map_err(|e| PlannerError::MalformedResponse(format!("could not encode plan: {e}")))?;
        let text = self.generate_content(prompt).await?;
        Ok(parse_plan(&text, false)?)
    }
}

/// Parses model output into a plan.
///
/// With `fill_missing_id`, a plan that comes back without an id gets a fresh one.
fn parse_plan(text: &str, fill_missing_id: bool) -> Result<WorkoutPlan, PlannerError> {
    let mut value: Value = serde_json::from_str(text.trim())
        .map_err(|e| PlannerError::MalformedResponse(format!("not valid JSON: {e}")))?;

    if fill_missing_id
        && let Some(obj) = value.as_object_mut()
        && obj
            .get("id")
            .is_none_or(|id| id.is_null() || id.as_str() == Some(""))
    {
        obj.insert("id".to_string(), Value::String(format!("plan-{}", Uuid::new_v4())));
    }

    let plan: WorkoutPlan = serde_json::from_value(value)
        .map_err(|e| PlannerError::MalformedResponse(format!("not a workout plan: {e}")))?;
    validate(&plan)?;
    Ok(plan)
}

fn validate(plan: &WorkoutPlan) -> Result<(), PlannerError> {
    if plan.weeks.is_empty() {
        return Err(PlannerError::MalformedResponse("plan has no weeks".to_string()));
    }
    let mut seen = HashSet::new();
    for day in plan.weeks.iter().flat_map(|w| &w.days) {
        if !seen.insert(day.id.as_str()) {
            return Err(PlannerError::MalformedResponse(format!(
                "duplicate day id: {}",
                day.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::model::*;

    fn plan_json() -> Value {
        json!({
            "id": "plan-1",
            "weeks": [{
                "id": "week1",
                "week": 1,
                "description": "Introduction/Baseline",
                "days": [{
                    "id": "week1-day1",
                    "day": 1,
                    "name": "Full Body A",
                    "isCompleted": false,
                    "exercises": [
                        { "id": "knee-pushup", "name": "Knee Push-ups", "sets": 3, "reps": 8, "rest": 90 },
                        { "id": "plank", "name": "Plank", "sets": 2, "duration": 30, "rest": 45 }
                    ]
                }]
            }]
        })
    }

    fn envelope(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] }
            }]
        })
    }

    fn onboarding() -> OnboardingData {
        OnboardingData {
            user_profile: UserProfile {
                weight_kg: 70.0,
                height_cm: 175.0,
            },
            fitness_profile: FitnessProfile {
                primary_goal: FitnessGoal::Strength,
                sessions_per_week: 3,
            },
            baseline: BaselineAssessment {
                max_pushups: 10,
                max_plank_seconds: 30,
                can_perform_standard_pushup: true,
                has_equipment: true,
            },
        }
    }

    fn planner(server: &MockServer) -> GeminiPlanner {
        GeminiPlanner::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    async fn respond_with(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn generates_plan_from_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(&plan_json().to_string())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let plan = planner(&server).generate_plan(&onboarding()).await.unwrap();

        assert_eq!(plan.id, "plan-1");
        let day = plan.find_day("week1-day1").unwrap();
        assert_eq!(day.exercises[0].target, Target::Reps { count: 8 });
        assert_eq!(day.exercises[1].target, Target::Timed { seconds: 30 });
    }

    #[tokio::test]
    async fn fills_missing_plan_id_on_generation() {
        let server = MockServer::start().await;
        let mut plan = plan_json();
        plan.as_object_mut().unwrap().remove("id");
        respond_with(
            &server,
            ResponseTemplate::new(200).set_body_json(envelope(&plan.to_string())),
        )
        .await;

        let plan = planner(&server).generate_plan(&onboarding()).await.unwrap();

        assert!(plan.id.starts_with("plan-"));
    }

    #[tokio::test]
    async fn adjustment_requires_plan_id() {
        let server = MockServer::start().await;
        let mut plan = plan_json();
        plan.as_object_mut().unwrap().remove("id");
        respond_with(
            &server,
            ResponseTemplate::new(200).set_body_json(envelope(&plan.to_string())),
        )
        .await;

        let current: WorkoutPlan = serde_json::from_value(plan_json()).unwrap();
        let err = planner(&server)
            .adjust_plan(&current, &[])
            .await
            .unwrap_err();

        assert!(matches!(err.0, PlannerError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn adjustment_sends_recent_sessions() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            ResponseTemplate::new(200).set_body_json(envelope(&plan_json().to_string())),
        )
        .await;

        let current: WorkoutPlan = serde_json::from_value(plan_json()).unwrap();
        let recent = vec![SessionLog::from_day(
            current.find_day("week1-day1").unwrap(),
            Rpe::Rated(5),
            Timestamp::now(),
        )];
        planner(&server).adjust_plan(&current, &recent).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("\"dayName\": \"Full Body A\""));
    }

    #[tokio::test]
    async fn api_error_surfaces_message() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            ResponseTemplate::new(429)
                .set_body_json(json!({ "error": { "message": "quota exceeded" } })),
        )
        .await;

        let err = planner(&server)
            .generate_plan(&onboarding())
            .await
            .unwrap_err();

        match err.0 {
            PlannerError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_text_is_malformed() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            ResponseTemplate::new(200).set_body_json(envelope("Sure! Here is your plan:")),
        )
        .await;

        let err = planner(&server)
            .generate_plan(&onboarding())
            .await
            .unwrap_err();

        assert!(matches!(err.0, PlannerError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn empty_candidates_are_malformed() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
        )
        .await;

        let err = planner(&server)
            .generate_plan(&onboarding())
            .await
            .unwrap_err();

        assert!(matches!(err.0, PlannerError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(envelope(&plan_json().to_string()))
                .set_delay(Duration::from_secs(2)),
        )
        .await;

        let planner = GeminiPlanner::new("test-key", Duration::from_millis(100))
            .unwrap()
            .with_base_url(server.uri());
        let err = planner.generate_plan(&onboarding()).await.unwrap_err();

        assert!(matches!(err.0, PlannerError::Request(_)));
    }

    #[tokio::test]
    async fn failed_request_does_not_reveal_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;
        let planner = GeminiPlanner::new("SECRET-KEY-123", Duration::from_millis(100))
            .unwrap()
            .with_base_url(server.uri());
        let current: WorkoutPlan = serde_json::from_value(plan_json()).unwrap();

        let err = planner.adjust_plan(&current, &[]).await.unwrap_err();

        assert!(matches!(err.0, PlannerError::Request(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].url.as_str().contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let server = MockServer::start().await;
        let planner = GeminiPlanner::new("", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let err = planner.generate_plan(&onboarding()).await.unwrap_err();

        assert!(matches!(err.0, PlannerError::MissingApiKey));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn rejects_exercise_without_target() {
        let mut plan = plan_json();
        plan["weeks"][0]["days"][0]["exercises"][0]
            .as_object_mut()
            .unwrap()
            .remove("reps");

        let err = parse_plan(&plan.to_string(), false).unwrap_err();

        assert!(matches!(err, PlannerError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_duplicate_day_ids() {
        let mut plan = plan_json();
        let day = plan["weeks"][0]["days"][0].clone();
        plan["weeks"][0]["days"].as_array_mut().unwrap().push(day);

        let err = parse_plan(&plan.to_string(), false).unwrap_err();

        assert!(err.to_string().contains("duplicate day id"));
    }

    #[test]
    fn rejects_plan_without_weeks() {
        let err = parse_plan(r#"{"id":"p","weeks":[]}"#, false).unwrap_err();
        assert!(err.to_string().contains("no weeks"));
    }
}
