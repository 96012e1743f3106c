//! HTTP surface tests against the assembled router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use img_gen_server::api::routes::create_router;
use img_gen_server::config::Settings;
use img_gen_server::generator::GeneratorRegistry;
use img_gen_server::orchestrator::GenerationOrchestrator;
use img_gen_server::resources::{Allocator, Inventory, ResourceUnit, UnitKind};
use img_gen_server::stats::ServerStats;
use img_gen_server::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn gpu_units(n: u32) -> Vec<ResourceUnit> {
    (0..n)
        .map(|id| ResourceUnit {
            id,
            kind: UnitKind::Dedicated,
            memory: "8192 MiB".to_string(),
            name: format!("GPU {id}"),
        })
        .collect()
}

fn build_state(units: Vec<ResourceUnit>) -> Arc<AppState> {
    let settings = Settings::default();
    let inventory = Arc::new(Inventory::from_units(units));
    let allocator = Arc::new(Allocator::with_poll_interval(
        &inventory,
        Duration::from_millis(5),
    ));
    let stats = Arc::new(ServerStats::new());
    let registry = Arc::new(GeneratorRegistry::from_config(&settings).unwrap());
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        allocator.clone(),
        stats.clone(),
        registry.clone(),
        Duration::from_secs(5),
    ));
    Arc::new(AppState {
        settings,
        inventory,
        allocator,
        stats,
        registry,
        orchestrator,
    })
}

fn generate_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_generate_returns_image_and_metadata() {
    let app = create_router(build_state(gpu_units(1)));

    let response = app
        .oneshot(generate_request(json!({
            "prompt": "A basket of kittens",
            "model": "flux",
            "width": 512,
            "height": 512,
            "steps": 20,
            "guidance_scale": 7.5,
            "seed": 42
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert!(!body["image"].as_str().unwrap().is_empty());
    let metadata = &body["metadata"];
    assert_eq!(metadata["prompt"], "A basket of kittens");
    assert_eq!(metadata["model"], "flux");
    assert_eq!(metadata["width"], 512);
    assert_eq!(metadata["height"], 512);
    assert_eq!(metadata["steps"], 20);
    assert_eq!(metadata["seed"], 42);
    assert_eq!(metadata["unit_id"], 0);
    assert!(metadata["generation_time"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_generate_rejects_out_of_range_dimensions() {
    let app = create_router(build_state(gpu_units(1)));

    let response = app
        .oneshot(generate_request(json!({
            "prompt": "A basket of kittens",
            "model": "flux",
            "width": 32
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_generate_rejects_unknown_model() {
    let app = create_router(build_state(gpu_units(1)));

    let response = app
        .oneshot(generate_request(json!({
            "prompt": "A basket of kittens",
            "model": "unknown"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "unsupported_model");
}

#[tokio::test]
async fn test_generate_returns_503_when_no_unit_is_available() {
    // CPU-only host: empty lock set, acquisition always times out
    let state = build_state(vec![ResourceUnit {
        id: 0,
        kind: UnitKind::Cpu,
        memory: "N/A".to_string(),
        name: "CPU: x86_64".to_string(),
    }]);
    let app = create_router(state);

    let response = app
        .oneshot(generate_request(json!({
            "prompt": "A basket of kittens",
            "model": "flux",
            "timeout": 0.0
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "resource_timeout");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router(build_state(gpu_units(1)));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_models_endpoint_lists_supported_models() {
    let app = create_router(build_state(gpu_units(1)));

    let response = app
        .oneshot(Request::builder().uri("/models").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["models"], json!(["flux", "sdxl"]));
}

#[tokio::test]
async fn test_status_reflects_successes_and_failures() {
    let state = build_state(gpu_units(1));
    let app = create_router(state);

    // Two successes
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(generate_request(json!({
                "prompt": "A basket of kittens",
                "model": "flux"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // One failure (unsupported model)
    let response = app
        .clone()
        .oneshot(generate_request(json!({
            "prompt": "A basket of kittens",
            "model": "unknown"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["status"], "running");
    assert_eq!(body["resource_count"], 1);
    assert_eq!(body["resources"][0]["kind"], "dedicated");
    let stats = &body["stats"];
    assert_eq!(stats["successful_generations"], 2);
    assert_eq!(stats["failed_generations"], 1);
    assert_eq!(stats["total_requests"], 3);
    assert!(stats["uptime_secs"].as_f64().unwrap() >= 0.0);
}
