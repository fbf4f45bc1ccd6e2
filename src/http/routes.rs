//! HTTP routes: health, room lookup, socket upgrade and static assets.

use std::path::Path as FsPath;

use axum::extract::{Path, State};
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::room::manager::RoomManager;
use crate::ws::connection::ws_handler;

#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomManager,
}

/// Full application router. Anything not matched falls through to the
/// static directory, which is where `images/bild<N>.jpg` live.
pub fn router(state: AppState, static_dir: &FsPath) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/rooms/:code", get(room_snapshot))
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_methods([Method::GET])
                    .allow_headers([header::CONTENT_TYPE])
                    .allow_origin(Any),
            ),
        )
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

pub async fn room_snapshot(Path(code): Path<String>, State(state): State<AppState>) -> impl IntoResponse {
    match state.rooms.snapshot(&code) {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (StatusCode::NOT_FOUND, "room not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use super::*;
    use crate::game::Player;
    use crate::room::manager::RoomSettings;
    use crate::ws::protocol::RoomSnapshot;

    fn app(rooms: RoomManager) -> Router {
        router(AppState { rooms }, FsPath::new("./does-not-exist"))
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let resp = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn health_check_answers_ok() {
        let (status, body) = fetch(app(RoomManager::default()), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn room_lookup_returns_snapshot_or_404() {
        let rooms = RoomManager::new(RoomSettings { total_pairs: 3, ..RoomSettings::default() });
        let (tx, _rx) = mpsc::unbounded_channel();
        let code = rooms.create_room(Player::new("p1", "Anna"), tx).unwrap();

        let (status, body) = fetch(app(rooms.clone()), &format!("/api/rooms/{code}")).await;
        assert_eq!(status, StatusCode::OK);
        let snapshot: RoomSnapshot = serde_json::from_slice(&body).unwrap();
        assert_eq!(snapshot.room_code, code);
        assert_eq!(snapshot.cards.len(), 6);

        let (status, _) = fetch(app(rooms), "/api/rooms/NOPE00").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_assets_are_404() {
        let (status, _) = fetch(app(RoomManager::default()), "/images/bild1.jpg").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
