use actix_cors::Cors;
use actix_web::{error, web, App, HttpResponse, HttpServer, Result as ActixResult};
use sdgx_storage::ArtifactError;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::pipeline::{ClusteringRequest, ClusteringService, PipelineError};

#[derive(Serialize)]
struct ModelInfo {
    scheme: u32,
    model: String,
    complete: bool,
    labelled: bool,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        service: Arc<ClusteringService>,
        host: String,
        port: u16,
        max_body_bytes: usize,
    ) -> std::io::Result<()> {
        info!(host = %host, port, "starting REST API");

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(service.clone()))
                .app_data(json_config(max_body_bytes))
                .configure(RestApi::configure)
        })
        .bind((host.as_str(), port))?
        .run()
        .await
    }

    /// Register the routes on an app
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/run-clustering", web::post().to(run_clustering))
            .route("/health", web::get().to(health))
            .route("/models", web::get().to(list_models));
    }
}

/// JSON extractor settings. Malformed or oversized bodies are answered
/// with the same `{"error": ...}` shape as every other failure.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Invalid request body: {}", err)
            }));
            error::InternalError::from_response(err, response).into()
        })
}

async fn run_clustering(
    service: web::Data<Arc<ClusteringService>>,
    req: web::Json<ClusteringRequest>,
) -> ActixResult<HttpResponse> {
    match service.run(req.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            warn!(stage = e.stage(), error = %e, "clustering failed");
            Ok(error_response(&e))
        }
    }
}

fn error_response(e: &PipelineError) -> HttpResponse {
    let mut builder = match e {
        PipelineError::Validation(_) => HttpResponse::BadRequest(),
        PipelineError::Artifact(ArtifactError::NotFound { .. }) => HttpResponse::NotFound(),
        PipelineError::Alignment(_) => HttpResponse::UnprocessableEntity(),
        PipelineError::Persistence(_) => HttpResponse::BadGateway(),
        PipelineError::Artifact(_) | PipelineError::Prediction(_) | PipelineError::Internal(_) => {
            HttpResponse::InternalServerError()
        }
    };
    builder.json(serde_json::json!({
        "error": e.to_string()
    }))
}

async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    })))
}

async fn list_models(service: web::Data<Arc<ClusteringService>>) -> ActixResult<HttpResponse> {
    let artifacts = service.artifacts().clone();
    let entries = match web::block(move || artifacts.list_schemes()).await? {
        Ok(entries) => entries,
        Err(e) => {
            return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            })));
        }
    };

    let models: Vec<ModelInfo> = entries
        .into_iter()
        .map(|entry| ModelInfo {
            scheme: entry.scheme.get(),
            labelled: service.labels().has_scheme(entry.scheme),
            model: entry.model,
            complete: entry.complete,
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "models_dir": service.artifacts().root(),
        "models": models
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use sdgx_core::LabelTables;
    use sdgx_storage::{ArtifactStore, MemorySink};
    use serde_json::{json, Value};
    use std::path::Path;

    fn write_scheme_one(dir: &Path) {
        std::fs::write(
            dir.join("model_sdg1.json"),
            r#"{
                "algorithm": "kprototypes",
                "gamma": 0.5,
                "numeric_centroids": [[1.0], [2.0]],
                "categorical_centroids": [["a"], ["b"]]
            }"#,
        )
        .unwrap();
        std::fs::write(dir.join("features_sdg1.json"), r#"["x", "cat"]"#).unwrap();
        std::fs::write(dir.join("cat_idx_sdg1.json"), "[1]").unwrap();
    }

    fn service(dir: &Path) -> Arc<ClusteringService> {
        Arc::new(ClusteringService::new(
            ArtifactStore::new(dir),
            Arc::new(LabelTables::builtin()),
            Arc::new(MemorySink::new()),
        ))
    }

    macro_rules! app {
        ($service:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($service))
                    .app_data(json_config(1024 * 1024))
                    .configure(RestApi::configure),
            )
            .await
        };
    }

    macro_rules! post {
        ($app:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri("/run-clustering")
                .set_json($body)
                .to_request();
            let resp = test::call_service(&$app, req).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }};
    }

    #[actix_web::test]
    async fn test_run_clustering_ok() {
        let dir = tempfile::tempdir().unwrap();
        write_scheme_one(dir.path());
        let app = app!(service(dir.path()));

        let (status, body) = post!(
            app,
            json!({"sdg_number": 1, "data": [{"x": 1, "cat": "a"}, {"x": 2, "cat": "b"}]})
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Clustering succeeded for SDG 1");
        assert_eq!(body["count"], 2);
        assert_eq!(body["results"][0]["cluster"], 0);
        assert_eq!(body["results"][0]["arti_cluster"], "Desa Prioritas Penanganan Kemiskinan");
        assert_eq!(body["results"][1]["cluster"], 1);
        assert_eq!(body["results"][1]["cat"], "b");
    }

    #[actix_web::test]
    async fn test_status_per_failing_stage() {
        let dir = tempfile::tempdir().unwrap();
        write_scheme_one(dir.path());
        let app = app!(service(dir.path()));

        let (status, body) = post!(app, json!({"data": [{"x": 1}]}));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = post!(app, json!({"sdg_number": 9, "data": [{"x": 1}]}));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("model_sdg9.json"));

        let (status, body) = post!(app, json!({"sdg_number": 1, "data": [{"x": 1}]}));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("cat"));

        let (status, body) = post!(app, json!({"sdg_number": 1, "data": [{"x": "banyak", "cat": "a"}]}));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("banyak"));
    }

    #[actix_web::test]
    async fn test_malformed_body_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(service(dir.path()));

        let req = test::TestRequest::post()
            .uri("/run-clustering")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[actix_web::test]
    async fn test_health_and_models() {
        let dir = tempfile::tempdir().unwrap();
        write_scheme_one(dir.path());
        std::fs::write(
            dir.path().join("model_sdg20.json"),
            r#"{"algorithm": "kmodes", "cluster_centroids": [["a"]]}"#,
        )
        .unwrap();
        let app = app!(service(dir.path()));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/models").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let models = body["models"].as_array().unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0]["scheme"], 1);
        assert_eq!(models[0]["complete"], true);
        assert_eq!(models[0]["labelled"], true);
        assert_eq!(models[1]["scheme"], 20);
        assert_eq!(models[1]["complete"], false);
        assert_eq!(models[1]["labelled"], false);
    }
}
