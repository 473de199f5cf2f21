//! HTTP front of the dispatcher.
//!
//! One catch-all route forwards the request path to [`Dispatcher::dispatch`].
//! The index is built on a blocking task while the server already answers,
//! so early requests see the loading page.

use super::Dispatcher;
use crate::corpus::Corpus;
use crate::index::IndexBuilder;
use crate::Settings;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{error, info};

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", axum::routing::get(root))
        .route("/{*resource}", axum::routing::get(resource))
        .with_state(dispatcher)
}

async fn root(State(dispatcher): State<Arc<Dispatcher>>) -> Response {
    respond(dispatcher.dispatch(""))
}

async fn resource(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path(resource): Path<String>,
) -> Response {
    respond(dispatcher.dispatch(&resource))
}

fn respond(page: super::Response) -> Response {
    let status = StatusCode::from_u16(page.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, page.content_type)],
        page.body.to_vec(),
    )
        .into_response()
}

/// Serve `corpus` on the configured address until Ctrl+C.
pub async fn serve(settings: Settings, corpus: Corpus) -> anyhow::Result<()> {
    let dispatcher = Arc::new(Dispatcher::new(&settings));

    let builder = IndexBuilder::new();
    let building = Arc::clone(&dispatcher);
    tokio::task::spawn_blocking(move || match builder.build(corpus) {
        Ok(index) => {
            building.install(index);
            info!("index installed, serving pages");
        }
        Err(e) => error!(error = %e, "index build failed"),
    });

    let bind = settings.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(%bind, "page server listening");
    eprintln!("Serving on http://{bind} (Ctrl+C to stop)");

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("page server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl+c");
    }
}
