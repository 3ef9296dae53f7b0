//! HTTP proxy in front of the upstream portal.
//!
//! Each route authenticates with the caller's bearer token, forwards to the
//! fixed upstream host and translates failures into JSON error bodies. The
//! `*-clean` and `*-simple` routes additionally run the GPA pipeline.

pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::fetch::HttpClient;
use routes::{
    clean_results_handler, department_path_handler, department_query_handler, faculty_handler,
    login_handler, simple_results_handler, student_info_handler, student_results_handler,
};
use state::AppState;

pub fn router<C: HttpClient + Clone + 'static>(state: Arc<AppState<C>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/login", post(login_handler::<C>))
        .route("/api/student-info", post(student_info_handler::<C>))
        .route("/api/student-results", post(student_results_handler::<C>))
        .route("/api/student-results-clean", post(clean_results_handler::<C>))
        .route("/api/student-results-simple", post(simple_results_handler::<C>))
        .route("/api/department", get(department_query_handler::<C>))
        .route("/api/department/{id}", get(department_path_handler::<C>))
        .route("/api/faculty", get(faculty_handler::<C>))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server<C: HttpClient + Clone + 'static>(
    state: Arc<AppState<C>>,
    port: u16,
) -> Result<()> {
    let app = router(state);

    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address).await?;
    info!(%address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
