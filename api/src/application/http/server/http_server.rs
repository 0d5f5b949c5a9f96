use std::sync::{Arc, OnceLock};

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use axum_prometheus::metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use axum_prometheus::PrometheusMetricLayer;
use nutrilens_core::application::create_service;
use nutrilens_core::domain::common::NutriLensConfig;
use tower_http::cors::CorsLayer;
use tracing::{debug, info_span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::http::health::health_routes;
use crate::application::http::image_nutrition::router::{
    image_nutrition_routes, ImageNutritionApiDoc,
};
use crate::application::http::server::app_state::AppState;
use crate::application::http::server::openapi::ApiDoc;
use crate::args::Args;

pub fn state(args: Arc<Args>) -> Result<AppState, anyhow::Error> {
    let config = NutriLensConfig::from(args.as_ref().clone());
    let service = create_service(config);
    Ok(AppState::new(args, service))
}

// The recorder is process-global; installing it once lets `router` be
// called repeatedly (tests build several routers per process).
fn metric_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install metrics recorder")
        })
        .clone()
}

///  Returns the [`Router`] of this application.
pub fn router(state: AppState) -> Result<Router, anyhow::Error> {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri: String = request.uri().to_string();
            info_span!("http_request", method = ?request.method(), uri)
        },
    );

    let cors = if state.args.server.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let allowed_origins = state
            .args
            .server
            .allowed_origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin))
            .collect::<Result<Vec<HeaderValue>, _>>()?;

        debug!("Allowed origins: {:?}", allowed_origins);

        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_origin(allowed_origins)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, CONTENT_LENGTH, ACCEPT, LOCATION])
            .allow_credentials(true)
    };

    let prometheus_layer = PrometheusMetricLayer::new();
    let metric_handle = metric_handle();

    let mut openapi = ApiDoc::openapi();
    openapi.merge(ImageNutritionApiDoc::openapi());
    let mut paths = openapi.paths.clone();
    paths.paths = openapi
        .paths
        .paths
        .into_iter()
        .map(|(path, item)| (format!("{}{path}", state.args.server.root_path), item))
        .collect();
    openapi.paths = paths;

    let root_path = state.args.server.root_path.clone();
    let api_docs_url = format!("{}/api-docs/openapi.json", root_path);

    let router = axum::Router::new()
        .merge(SwaggerUi::new(format!("{}/swagger-ui", root_path)).url(api_docs_url, openapi))
        .merge(image_nutrition_routes(state.clone()))
        .merge(health_routes(&root_path))
        .route(
            &format!("{}/metrics", root_path),
            get(|| async move { metric_handle.render() }),
        )
        .layer(trace_layer)
        .layer(cors)
        .layer(prometheus_layer)
        .with_state(state);
    Ok(router)
}
