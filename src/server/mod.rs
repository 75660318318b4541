use crate::config::Config;
use crate::error::TurkError;
use crate::runtime::service::{Page, TurkService};
use crate::store::Record;
use anyhow::{Context as AnyhowContext, Result};
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

#[derive(Clone)]
struct AppState {
    service: Arc<TurkService>,
    /// Set when the server should stop after reporting `DONE`.
    done: Option<Arc<Notify>>,
}

/// `GET /` renders the next batch, `POST /submit` saves one. Anything else
/// is looked up in `static_dir` when given.
pub fn router(service: Arc<TurkService>, static_dir: Option<&Path>, done: Option<Arc<Notify>>) -> Router {
    let router = Router::new()
        .route("/", get(show_batch))
        .route("/submit", post(submit_batch))
        .with_state(AppState { service, done });

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

async fn show_batch(State(state): State<AppState>) -> Response {
    match state.service.render_next().await {
        Page::Batch { html, .. } => Html(html).into_response(),
        Page::Done => {
            if let Some(done) = &state.done {
                info!("All tasks completed, shutting down");
                done.notify_one();
            }
            "DONE".into_response()
        }
    }
}

async fn submit_batch(State(state): State<AppState>, Form(form): Form<Record>) -> Response {
    match state.service.submit(form).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            if e.is_client_error() {
                warn!(error = %e, "Rejected submission");
            } else {
                error!(error = %e, "Failed to save submission");
            }
            (status_for(&e), format!("ERROR: {e}")).into_response()
        }
    }
}

fn status_for(err: &TurkError) -> StatusCode {
    match err {
        TurkError::StaleBatch { .. } => StatusCode::CONFLICT,
        TurkError::SchemaGap(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Serve until interrupted, or until `DONE` is reported with `quit_on_done`.
pub async fn run(config: &Config, service: Arc<TurkService>) -> Result<()> {
    let done = config.quit_on_done.then(|| Arc::new(Notify::new()));
    let app = router(service, config.static_dir.as_deref(), done.clone());

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    let url = config.url();
    info!("Running local turk on {}", url);
    if config.open_browser {
        if let Err(e) = webbrowser::open(&url) {
            warn!(error = %e, "Could not open a browser");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let finished = async {
                match done {
                    Some(done) => done.notified().await,
                    None => std::future::pending().await,
                }
            };
            tokio::select! {
                _ = finished => {}
                _ = tokio::signal::ctrl_c() => info!("Interrupted"),
            }
        })
        .await
        .context("Server error")?;

    Ok(())
}
