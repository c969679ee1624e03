use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use overrun::artifacts::ModelArtifacts;
use overrun::dataset::{GenerateOptions, generate_projects};
use overrun::ml::gbdt::TrainOptions;
use overrun::predict::Predictor;
use overrun::server::{AppState, router};
use overrun::training::{TrainingOptions, train_artifacts};

fn trained_app(cors: bool) -> axum::Router {
    let records = generate_projects(&GenerateOptions {
        rows: 400,
        seed: Some(17),
    });
    let options = TrainingOptions {
        gbdt: TrainOptions {
            rounds: 25,
            learning_rate: 0.2,
            max_depth: 4,
            ..TrainOptions::default()
        },
        ..TrainingOptions::default()
    };
    let report = train_artifacts(&records, &options).unwrap();

    // Go through disk so the service sees exactly what the trainer wrote.
    let dir = tempfile::tempdir().unwrap();
    report.artifacts.save(dir.path()).unwrap();
    let artifacts = ModelArtifacts::load(dir.path()).unwrap();
    router(AppState::new(Predictor::new(artifacts).unwrap()), cors)
}

fn predict_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn substation_prediction_end_to_end() {
    let response = trained_app(true)
        .oneshot(predict_request(json!({
            "projectName": "Bayview Substation",
            "projectType": "Substation",
            "terrain": "Plains",
            "vendorPerformance": "Good",
            "materialAvailability": "High"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let time = body["predictedTimeOverrun"].as_i64().unwrap();
    assert!(time >= 0);
    assert!(body["predictedCostOverrun"].is_number());
    assert_eq!(body["confidenceScore"], json!(88.7));

    let hotspots = body["hotspots"].as_array().unwrap();
    assert_eq!(hotspots.len(), 5);
    for hotspot in hotspots {
        assert!(hotspot["feature"].is_string());
        assert!(hotspot["impact"].is_number());
        assert!(!hotspot["description"].as_str().unwrap().is_empty());
    }

    let overruns = body["historicalData"]["overruns"].as_array().unwrap();
    assert_eq!(overruns.len(), 30);
    assert!(
        overruns
            .iter()
            .all(|v| (10..=60).contains(&v.as_i64().unwrap()))
    );

    let categories = body["riskCategories"].as_array().unwrap();
    assert!(categories.len() <= 4);
    if !categories.is_empty() {
        let total: f64 = categories
            .iter()
            .map(|c| c["percentage"].as_f64().unwrap())
            .sum();
        assert!((total - 100.0).abs() <= 0.1 + 1e-9, "{total}");
    }
}

#[tokio::test]
async fn hilly_poor_vendor_risk_adds_up() {
    let response = trained_app(true)
        .oneshot(predict_request(json!({
            "projectName": "Summit Line",
            "projectType": "Overhead Line",
            "terrain": "Hilly",
            "vendorPerformance": "Poor",
            "materialAvailability": "Medium"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["predictedTimeOverrun"].as_i64().unwrap() > 0);

    let categories = body["riskCategories"].as_array().unwrap();
    let names: Vec<&str> = categories
        .iter()
        .map(|c| c["category"].as_str().unwrap())
        .collect();
    assert_eq!(&names[..2], ["Geospatial", "Vendor-Related"]);
    let total: f64 = categories
        .iter()
        .map(|c| c["percentage"].as_f64().unwrap())
        .sum();
    assert!((total - 100.0).abs() <= 0.1 + 1e-9, "{total}");
}

#[tokio::test]
async fn underground_cable_history_range() {
    let response = trained_app(false)
        .oneshot(predict_request(json!({
            "projectName": "Harbor Link",
            "projectType": "Underground Cable",
            "terrain": "Coastal",
            "vendorPerformance": "Average",
            "materialAvailability": "Low"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let overruns = body["historicalData"]["overruns"].as_array().unwrap();
    assert!(
        overruns
            .iter()
            .all(|v| (45..=150).contains(&v.as_i64().unwrap()))
    );
}

#[tokio::test]
async fn missing_field_is_unprocessable() {
    let response = trained_app(true)
        .oneshot(predict_request(json!({
            "projectName": "Half Filled",
            "projectType": "Substation"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"projectName\":"))
        .unwrap();
    let response = trained_app(true).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cors_allows_any_origin_when_enabled() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = trained_app(true).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}
