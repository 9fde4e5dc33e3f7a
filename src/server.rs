// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::cache::{CacheStatus, RevalidatingCache};
use crate::error::{PlayError, RegenerateError};
use crate::home::render_episode_page;
use crate::http::HttpClient;
use crate::player::PlaybackQueue;
use crate::progress::SharedRegenerationReporter;
use crate::regenerate::{HomeSnapshot, SiteOptions, regenerate_home};

/// Cache key of the homepage
pub const HOME_ROUTE: &str = "/";

/// Shared state of the web server
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn HttpClient>,
    pub options: Arc<SiteOptions>,
    pub cache: Arc<RevalidatingCache<HomeSnapshot>>,
    pub player: Arc<PlaybackQueue>,
    pub reporter: SharedRegenerationReporter,
}

impl AppState {
    pub fn new(
        client: Arc<dyn HttpClient>,
        options: SiteOptions,
        player: Arc<PlaybackQueue>,
        reporter: SharedRegenerationReporter,
    ) -> Self {
        let cache = Arc::new(RevalidatingCache::new(options.revalidate));
        Self {
            client,
            options: Arc::new(options),
            cache,
            player,
            reporter,
        }
    }

    /// The current homepage snapshot, regenerating it when needed
    pub async fn home_snapshot(
        &self,
    ) -> Result<(Arc<HomeSnapshot>, CacheStatus), Arc<RegenerateError>> {
        let client = Arc::clone(&self.client);
        let options = Arc::clone(&self.options);
        let reporter = Arc::clone(&self.reporter);

        self.cache
            .get_or_regenerate(HOME_ROUTE, move || async move {
                regenerate_home(client.as_ref(), &options, &reporter).await
            })
            .await
    }

    fn cache_control(&self) -> String {
        format!(
            "s-maxage={}, stale-while-revalidate",
            self.options.revalidate.as_secs()
        )
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/home", get(home_props))
        .route("/episodes/{id}", get(episode))
        .route("/play", post(play))
        .route("/player", get(player))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutting down");
}

fn unavailable(error: &RegenerateError) -> Response {
    tracing::error!(%error, "No homepage snapshot available");
    (
        StatusCode::BAD_GATEWAY,
        "Os episódios estão indisponíveis no momento.",
    )
        .into_response()
}

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (snapshot, status) = match state.home_snapshot().await {
        Ok(found) => found,
        Err(e) => return unavailable(&e),
    };

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.split(',').any(|tag| tag.trim() == snapshot.etag));

    let response_headers = [
        (header::ETAG, snapshot.etag.clone()),
        (header::CACHE_CONTROL, state.cache_control()),
        (header::HeaderName::from_static("x-cache"), status.as_str().to_string()),
    ];

    if not_modified {
        return (StatusCode::NOT_MODIFIED, response_headers).into_response();
    }

    (response_headers, Html(snapshot.html.clone())).into_response()
}

async fn home_props(State(state): State<AppState>) -> Response {
    match state.home_snapshot().await {
        Ok((snapshot, _)) => Json(snapshot.props.clone()).into_response(),
        Err(e) => unavailable(&e),
    }
}

async fn episode(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let snapshot = match state.home_snapshot().await {
        Ok((snapshot, _)) => snapshot,
        Err(e) => return unavailable(&e),
    };

    let Some(episode) = snapshot.props.find_episode(&id) else {
        return (StatusCode::NOT_FOUND, "Episódio não encontrado.").into_response();
    };

    match render_episode_page(episode) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, episode = %id, "Failed to render episode page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Fields posted by a homepage play trigger
#[derive(Debug, Deserialize)]
struct PlayForm {
    /// List version of the page the trigger was rendered on
    version: String,
    index: usize,
}

async fn play(State(state): State<AppState>, Form(form): Form<PlayForm>) -> Response {
    let snapshot = match state.home_snapshot().await {
        Ok((snapshot, _)) => snapshot,
        Err(e) => return unavailable(&e),
    };

    let result = snapshot
        .props
        .play_listed(state.player.as_ref(), &form.version, form.index);

    match result {
        Ok(()) => Redirect::to(HOME_ROUTE).into_response(),
        Err(e @ PlayError::ListChanged { .. }) => {
            tracing::debug!(error = %e, "Play request from an outdated page");
            (
                StatusCode::CONFLICT,
                Html(concat!(
                    "<p>A lista de episódios mudou desde que a página foi carregada.</p>",
                    r#"<p><a href="/">Recarregar</a></p>"#
                )),
            )
                .into_response()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected play request");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

async fn player(State(state): State<AppState>) -> Response {
    Json(state.player.snapshot()).into_response()
}
