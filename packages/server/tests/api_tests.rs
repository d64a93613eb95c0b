//! HTTP API tests: the full router against the test database, with the LLM
//! and web search mocked.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::common::{create_test_policy, unique, TestHarness};
use policy_core::domains::answers::prompts::{DISCLAIMER, INSUFFICIENT_CONTEXT, NOT_FOUND_ANSWER};
use policy_core::kernel::test_dependencies::{MockAI, MockSearchService};
use policy_core::kernel::{SearchResult, TestDependencies};
use test_context::test_context;

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[test_context(TestHarness)]
#[tokio::test]
async fn health_reports_database_ok(ctx: &TestHarness) {
    let (status, body) = send(ctx.app(TestDependencies::new()), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
    assert_eq!(body["web_search"], "disabled");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn policy_crud_round_trip(ctx: &TestHarness) {
    let identifier = unique("meal-plan");
    let category = unique("dining");

    let (status, created) = send(
        ctx.app(TestDependencies::new()),
        "POST",
        "/api/policies",
        Some(json!({
            "identifier": identifier,
            "title": "Meal Plan Policy",
            "category": category,
            "content": "All first-year residents must hold a meal plan.",
            "source_url": "https://www.example.edu/dining/meal-plan-policy"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["identifier"], identifier);
    assert_eq!(created["summary"], "All first-year residents must hold a meal plan.");
    assert_eq!(created["source_name"], "Manual entry");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, duplicate) = send(
        ctx.app(TestDependencies::new()),
        "POST",
        "/api/policies",
        Some(json!({
            "identifier": identifier,
            "title": "Again",
            "content": "Duplicate.",
            "source_url": "https://www.example.edu/dining/again"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(duplicate["error"].is_string());

    let (status, updated) = send(
        ctx.app(TestDependencies::new()),
        "PUT",
        &format!("/api/policies/{}", id),
        Some(json!({ "content": "Residents of all years must hold a meal plan." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["summary"], "Residents of all years must hold a meal plan.");
    assert_eq!(updated["title"], "Meal Plan Policy");

    let (status, listed) = send(
        ctx.app(TestDependencies::new()),
        "GET",
        &format!("/api/policies?category={}", category),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(
        ctx.app(TestDependencies::new()),
        "DELETE",
        &format!("/api/policies/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, missing) = send(
        ctx.app(TestDependencies::new()),
        "GET",
        &format!("/api/policies/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(missing["error"].as_str().unwrap().contains(&id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invalid_requests_return_json_errors(ctx: &TestHarness) {
    let (status, body) = send(
        ctx.app(TestDependencies::new()),
        "GET",
        "/api/policies/not-a-uuid",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        ctx.app(TestDependencies::new()),
        "POST",
        "/api/ask",
        Some(json!({ "question": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        ctx.app(TestDependencies::new()),
        "POST",
        "/api/ask",
        Some(json!({ "question": "x".repeat(1001) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn ask_answers_from_category_policies(ctx: &TestHarness) {
    let category = unique("housing");
    create_test_policy(
        &ctx.db_pool,
        &category,
        "Guest Policy",
        "Overnight guests may stay up to three nights per month.",
    )
    .await
    .unwrap();

    let ai = MockAI::new().with_response("Guests may stay three nights per month (Guest Policy).");
    let deps = TestDependencies::new().mock_ai(ai);
    let mock_ai = deps.ai.clone();

    let (status, body) = send(
        ctx.app(deps),
        "POST",
        "/api/ask",
        Some(json!({ "question": " How long can my guest stay? ", "category": category })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "policies");
    assert_eq!(body["disclaimer"], DISCLAIMER);
    assert_eq!(body["citations"][0]["title"], "Guest Policy");
    assert_eq!(body["citations"][0]["category"], category);
    assert!(mock_ai.was_called_with("Overnight guests may stay up to three nights"));
    assert!(mock_ai.was_called_with("Question: How long can my guest stay?"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn ask_falls_back_to_web_search(ctx: &TestHarness) {
    let category = unique("empty");
    let search = MockSearchService::new().with_results(vec![SearchResult {
        title: "Commencement".to_string(),
        url: "https://www.example.edu/commencement".to_string(),
        content: "Commencement is held in May.".to_string(),
        score: 0.9,
    }]);
    let ai = MockAI::new().with_response("Commencement is held in May.");
    let deps = TestDependencies::new().mock_ai(ai).mock_search(search);

    let (status, body) = send(
        ctx.app(deps),
        "POST",
        "/api/ask",
        Some(json!({ "question": "When is commencement?", "category": category })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "web_search");
    assert_eq!(body["citations"][0]["url"], "https://www.example.edu/commencement");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn ask_without_coverage_or_searcher_is_not_found(ctx: &TestHarness) {
    let category = unique("conduct");
    create_test_policy(&ctx.db_pool, &category, "Conduct Code", "Students must act with integrity.")
        .await
        .unwrap();
    let deps = TestDependencies::new().mock_ai(MockAI::new().with_response(INSUFFICIENT_CONTEXT));

    let (status, body) = send(
        ctx.app(deps),
        "POST",
        "/api/ask",
        Some(json!({ "question": "Where do I park?", "category": category })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], NOT_FOUND_ANSWER);
    assert_eq!(body["citations"].as_array().unwrap().len(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn ask_maps_model_failure_to_bad_gateway(ctx: &TestHarness) {
    let category = unique("financial");
    create_test_policy(&ctx.db_pool, &category, "Refunds", "Refunds are prorated.")
        .await
        .unwrap();
    let deps = TestDependencies::new().mock_ai(MockAI::new().with_error("connection reset"));

    let (status, body) = send(
        ctx.app(deps),
        "POST",
        "/api/ask",
        Some(json!({ "question": "How are refunds calculated?", "category": category })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream service failed");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn ask_search_requires_configured_searcher(ctx: &TestHarness) {
    let (status, _) = send(
        ctx.app(TestDependencies::new()),
        "POST",
        "/api/ask/search",
        Some(json!({ "question": "When is commencement?" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
