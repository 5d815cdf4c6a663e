use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Extension, State},
    http::{HeaderName, Request, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::messages;
use crate::planner::{
    ConsultationRequest, GlucoseReading, PlanOutcome, PlanResult, Planner, ValidationError,
};
use crate::render::{render_page, FormValues, PageView};

#[derive(Debug, Deserialize)]
struct PlanRequest {
    fasting_sugar: i64,
    pre_meal_sugar: i64,
    post_meal_sugar: i64,
    #[serde(default)]
    preferences: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct FailedPlanResponse {
    error: &'static str,
    #[serde(flatten)]
    placeholders: PlanResult,
}

/// Shared state for all routes.
///
/// `planner` is `None` when the provider keys are missing; pages then show a
/// warning and submissions are refused.
#[derive(Clone)]
pub struct AppState {
    pub planner: Option<Planner>,
    pub footer: String,
}

#[derive(Clone, Debug)]
struct RequestContext {
    request_id: String,
}

pub fn router(state: AppState) -> Router {
    let request_id_layer = middleware::from_fn(assign_request_id);
    Router::new()
        .route("/", get(index))
        .route("/plan", post(submit_form))
        .route("/api/plan", post(api_plan))
        .route("/api/info", get(info))
        .with_state(state)
        .layer(request_id_layer)
}

fn base_view(state: &AppState, form: FormValues) -> PageView {
    PageView {
        form,
        warning: state
            .planner
            .is_none()
            .then(|| messages::API_KEYS_MISSING.to_string()),
        footer: state.footer.clone(),
        ..PageView::default()
    }
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&base_view(&state, FormValues::default())))
}

fn parse_form(form: &FormValues) -> Result<ConsultationRequest, ValidationError> {
    Ok(ConsultationRequest {
        fasting_sugar: GlucoseReading::parse_field(messages::FASTING_LABEL, &form.fasting_sugar)?,
        pre_meal_sugar: GlucoseReading::parse_field(messages::PRE_MEAL_LABEL, &form.pre_meal_sugar)?,
        post_meal_sugar: GlucoseReading::parse_field(
            messages::POST_MEAL_LABEL,
            &form.post_meal_sugar,
        )?,
        preferences: form.preferences.clone(),
    })
}

async fn submit_form(
    State(state): State<AppState>,
    Extension(request): Extension<RequestContext>,
    Form(form): Form<FormValues>,
) -> Response {
    let mut view = base_view(&state, form);
    let Some(planner) = state.planner.as_ref() else {
        tracing::debug!(request_id = %request.request_id, "Plan requested without provider keys");
        return (StatusCode::SERVICE_UNAVAILABLE, Html(render_page(&view))).into_response();
    };

    let consultation = match parse_form(&view.form) {
        Ok(consultation) => consultation,
        Err(err) => {
            tracing::debug!(request_id = %request.request_id, error = %err, "Rejected form input");
            view.validation = Some(err.to_string());
            return (StatusCode::BAD_REQUEST, Html(render_page(&view))).into_response();
        }
    };

    let outcome = planner.consult(&consultation).await;
    if let PlanOutcome::Failed { .. } = outcome {
        tracing::warn!(request_id = %request.request_id, "Meal plan generation failed");
    } else {
        tracing::debug!(request_id = %request.request_id, "Rendered meal plan");
    }
    view.outcome = Some(outcome);
    (StatusCode::OK, Html(render_page(&view))).into_response()
}

async fn api_plan(
    State(state): State<AppState>,
    Extension(request): Extension<RequestContext>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Response {
    let Some(planner) = state.planner.as_ref() else {
        return not_configured_response();
    };

    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::debug!(
                request_id = %request.request_id,
                error = %rejection.body_text(),
                "Rejected API body"
            );
            return bad_request_response(rejection.body_text());
        }
    };

    let consultation = match ConsultationRequest::from_values(
        payload.fasting_sugar,
        payload.pre_meal_sugar,
        payload.post_meal_sugar,
        payload.preferences,
    ) {
        Ok(consultation) => consultation,
        Err(err) => {
            tracing::debug!(request_id = %request.request_id, error = %err, "Rejected API input");
            return bad_request_response(err.to_string());
        }
    };

    match planner.consult(&consultation).await {
        PlanOutcome::Ready(plan) => (StatusCode::OK, Json(plan)).into_response(),
        PlanOutcome::Failed { placeholders, .. } => {
            tracing::warn!(request_id = %request.request_id, "Meal plan generation failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(FailedPlanResponse {
                    error: "provider_failed",
                    placeholders,
                }),
            )
                .into_response()
        }
    }
}

async fn info() -> String {
    crate::system_info::get_system_info()
}

async fn assign_request_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });
    let method = req.method().clone();
    let uri = req.uri().clone();
    let mut response = next.run(req).await;
    let status = response.status();
    if let Ok(value) = request_id.parse() {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }
    tracing::debug!(
        request_id,
        method = %method,
        uri = %uri,
        status = %status,
        "HTTP request completed"
    );
    response
}

fn bad_request_response(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid_request",
            message: Some(message),
        }),
    )
        .into_response()
}

fn not_configured_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "not_configured",
            message: Some(messages::API_KEYS_MISSING.to_string()),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::common::{GenerationRequest, TextGenerator};
    use crate::ai::error::ProviderError;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Answers every prompt with a fixed text and counts calls.
    struct Echo {
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Echo {
        fn new(reply: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map(str::to_string)
                .ok_or(ProviderError::EmptyResponse { provider: "echo" })
        }
    }

    fn app_with(planner: Option<Planner>) -> Router {
        router(AppState {
            planner,
            footer: "test build".to_string(),
        })
    }

    async fn body_text(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/plan")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn index_renders_form_with_request_id() {
        let a = Echo::new(Some("PlanX"));
        let app = app_with(Some(Planner::new(a.clone(), a)));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let page = body_text(response).await;
        assert!(page.contains(messages::SUBMIT_LABEL));
        assert!(!page.contains(messages::API_KEYS_MISSING));
    }

    #[tokio::test]
    async fn index_warns_without_keys() {
        let response = app_with(None)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(messages::API_KEYS_MISSING));
    }

    #[tokio::test]
    async fn form_submission_renders_plan() {
        let a = Echo::new(Some("PlanX"));
        let b = Echo::new(Some("Details"));
        let app = app_with(Some(Planner::new(a.clone(), b.clone())));
        let response = app
            .oneshot(form_request(
                "fasting_sugar=90&pre_meal_sugar=110&post_meal_sugar=150&preferences=vegan",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains("<p>PlanX</p>"));
        assert!(page.contains("<p>Details</p>"));
        assert!(page.contains("value=\"vegan\""));
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn out_of_range_form_is_rejected_before_providers() {
        let a = Echo::new(Some("PlanX"));
        let app = app_with(Some(Planner::new(a.clone(), a.clone())));
        let response = app
            .oneshot(form_request(
                "fasting_sugar=900&pre_meal_sugar=110&post_meal_sugar=150&preferences=",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let page = body_text(response).await;
        assert!(page.contains("Fasting Sugar Level must be between 0 and 500"));
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_failure_renders_placeholders() {
        let a = Echo::new(Some("PlanX"));
        let b = Echo::new(None);
        let app = app_with(Some(Planner::new(a, b.clone())));
        let response = app
            .oneshot(form_request(
                "fasting_sugar=90&pre_meal_sugar=110&post_meal_sugar=150&preferences=x",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains(messages::GENERATION_FAILED));
        assert!(page.contains(messages::MEAL_PLAN_ERROR));
        assert!(!page.contains("<p>PlanX</p>"));
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn form_without_keys_is_unavailable() {
        let response = app_with(None)
            .oneshot(form_request(
                "fasting_sugar=90&pre_meal_sugar=110&post_meal_sugar=150&preferences=x",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn api_plan_returns_json() {
        let a = Echo::new(Some("  PlanX\n"));
        let b = Echo::new(Some("Same"));
        let app = app_with(Some(Planner::new(a, b)));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/plan")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"fasting_sugar":90,"pre_meal_sugar":100,"post_meal_sugar":140,"preferences":"keto"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let payload: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload["meal_plan"], "PlanX");
        assert_eq!(payload["nutritional_info"], "Same");
        assert_eq!(payload["expert_insights"], "Same");
    }

    #[tokio::test]
    async fn api_plan_rejects_negative_reading() {
        let a = Echo::new(Some("PlanX"));
        let app = app_with(Some(Planner::new(a.clone(), a.clone())));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/plan")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"fasting_sugar":-1,"pre_meal_sugar":100,"post_meal_sugar":140}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload["error"], "invalid_request");
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn api_plan_rejects_non_integer_readings() {
        let a = Echo::new(Some("PlanX"));
        let app = app_with(Some(Planner::new(a.clone(), a.clone())));
        for body in [
            r#"{"fasting_sugar":90.5,"pre_meal_sugar":100,"post_meal_sugar":140}"#,
            r#"{"fasting_sugar":"abc","pre_meal_sugar":100,"post_meal_sugar":140}"#,
            r#"{"fasting_sugar":90"#,
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/plan")
                        .header("content-type", "application/json")
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let payload: serde_json::Value =
                serde_json::from_str(&body_text(response).await).unwrap();
            assert_eq!(payload["error"], "invalid_request");
        }
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn api_plan_failure_is_bad_gateway() {
        let a = Echo::new(None);
        let b = Echo::new(Some("unused"));
        let app = app_with(Some(Planner::new(a, b.clone())));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/plan")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"fasting_sugar":90,"pre_meal_sugar":100,"post_meal_sugar":140}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let payload: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload["error"], "provider_failed");
        assert_eq!(payload["meal_plan"], messages::MEAL_PLAN_ERROR);
        assert_eq!(payload["expert_insights"], messages::INSIGHTS_ERROR);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn api_plan_without_keys_is_unavailable() {
        let response = app_with(None)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/plan")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"fasting_sugar":90,"pre_meal_sugar":100,"post_meal_sugar":140}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn info_reports_package() {
        let response = app_with(None)
            .oneshot(
                Request::builder()
                    .uri("/api/info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(env!("CARGO_PKG_NAME")));
    }
}
