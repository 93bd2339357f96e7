use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{
    net::TcpListener,
    sync::{broadcast, Mutex},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    catalog::{Catalog, CatalogError},
    config::GameConfig,
    economy::PlacementQuote,
    engine::EngineBuilder,
    error::GameError,
    notify::{Notice, Notifier},
    session::{Session, SessionView},
};

/// Forwards notices to every connected SSE client and to the log.
#[derive(Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notice>,
}

impl BroadcastNotifier {
    pub fn new(tx: broadcast::Sender<Notice>) -> Self {
        Self { tx }
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notice: Notice) {
        tracing::info!(kind = ?notice.kind, "{}", notice.message);
        // No subscribers is not an error.
        let _ = self.tx.send(notice);
    }
}

pub struct AppState {
    session: Mutex<Session>,
    notices: broadcast::Sender<Notice>,
}

impl AppState {
    pub fn new(config: GameConfig, catalog: Catalog) -> Result<Arc<Self>, CatalogError> {
        let (tx, _) = broadcast::channel::<Notice>(256);
        let seed = config.seed;
        let engine = EngineBuilder::new(config).with_catalog(catalog).build()?;
        let session = Session::new(engine, seed, BroadcastNotifier::new(tx.clone()));
        Ok(Arc::new(Self {
            session: Mutex::new(session),
            notices: tx,
        }))
    }
}

pub struct WebServerConfig {
    pub config: GameConfig,
    pub catalog: Catalog,
    pub host: String,
    pub port: u16,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/catalog", get(catalog))
        .route("/api/state", get(current_state))
        .route("/api/place", post(place))
        .route("/api/remove", post(remove))
        .route("/api/next-year", post(next_year))
        .route("/api/reset", post(reset))
        .route("/api/notices", get(stream_notices))
        .with_state(state)
}

pub async fn run(server: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        config,
        catalog,
        host,
        port,
    } = server;
    let name = config.name.clone();
    let state = AppState::new(config, catalog)?;

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(game = %name, "API live at http://{addr} (Ctrl+C to stop)");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down API server");
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    net_cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual_cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refund_amount: Option<i64>,
}

#[derive(Debug)]
pub struct ApiError(GameError);

impl From<GameError> for ApiError {
    fn from(value: GameError) -> Self {
        ApiError(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            GameError::InsufficientBudget { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GameError::InvalidCellIndex(_) | GameError::UnknownSource(_) => StatusCode::BAD_REQUEST,
            GameError::GameOver => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, costs) = match self.0 {
            GameError::InsufficientBudget {
                net_cost,
                actual_cost,
                refund_amount,
            } => (
                "insufficient_budget",
                Some((net_cost, actual_cost, refund_amount)),
            ),
            GameError::InvalidCellIndex(_) => ("invalid_cell_index", None),
            GameError::UnknownSource(_) => ("unknown_source", None),
            GameError::GameOver => ("game_over", None),
        };
        let body = ErrorBody {
            error,
            message: self.0.to_string(),
            net_cost: costs.map(|(net, _, _)| net),
            actual_cost: costs.map(|(_, actual, _)| actual),
            refund_amount: costs.map(|(_, _, refund)| refund),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub cell: usize,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub cell: usize,
}

#[derive(Debug, Serialize)]
pub struct PlaceResponse {
    pub quote: PlacementQuote,
    pub view: SessionView,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub refund: i64,
    pub view: SessionView,
}

async fn catalog(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    let session = state.session.lock().await;
    Json(session.engine().catalog().clone())
}

async fn current_state(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(state.session.lock().await.view())
}

async fn place(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaceRequest>,
) -> Result<Json<PlaceResponse>, ApiError> {
    let mut session = state.session.lock().await;
    let quote = session.place(request.cell, &request.source)?;
    Ok(Json(PlaceResponse {
        quote,
        view: session.view(),
    }))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RemoveRequest>,
) -> Result<Json<RemoveResponse>, ApiError> {
    let mut session = state.session.lock().await;
    let refund = session.remove(request.cell)?;
    Ok(Json(RemoveResponse {
        refund,
        view: session.view(),
    }))
}

async fn next_year(State(state): State<Arc<AppState>>) -> Result<Json<SessionView>, ApiError> {
    let mut session = state.session.lock().await;
    session.next_year()?;
    Ok(Json(session.view()))
}

async fn reset(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    session.reset();
    Json(session.view())
}

async fn stream_notices(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.notices.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(notice) => serde_json::to_string(&notice)
            .ok()
            .map(|payload| Ok(Event::default().event("notice").data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeKind;

    fn app() -> Arc<AppState> {
        AppState::new(GameConfig::default(), Catalog::builtin()).unwrap()
    }

    #[tokio::test]
    async fn place_and_remove_round_trip_budget() {
        let state = app();
        let Json(placed) = place(
            State(state.clone()),
            Json(PlaceRequest {
                cell: 0,
                source: "wind".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(placed.quote.actual_cost, 24);
        assert_eq!(placed.view.state.budget, 76);

        let Json(removed) = remove(State(state.clone()), Json(RemoveRequest { cell: 0 }))
            .await
            .unwrap();
        assert_eq!(removed.refund, 24);
        assert_eq!(removed.view.state.budget, 100);
    }

    #[tokio::test]
    async fn rule_errors_map_to_statuses() {
        let state = app();
        let err = place(
            State(state.clone()),
            Json(PlaceRequest {
                cell: 25,
                source: "wind".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // Offshore nuclear costs 56, leaving 44; Lab Zone nuclear then costs 48.
        place(
            State(state.clone()),
            Json(PlaceRequest {
                cell: 15,
                source: "nuclear".to_string(),
            }),
        )
        .await
        .unwrap();
        let err = place(
            State(state.clone()),
            Json(PlaceRequest {
                cell: 17,
                source: "nuclear".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn finished_game_conflicts_until_reset() {
        let state = app();
        for _ in 0..5 {
            next_year(State(state.clone())).await.unwrap();
        }
        let err = next_year(State(state.clone())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let Json(view) = reset(State(state.clone())).await;
        assert_eq!(view.state.year, 1);
        assert!(!view.state.game_over);
    }

    #[tokio::test]
    async fn notices_are_broadcast() {
        let state = app();
        let mut rx = state.notices.subscribe();
        next_year(State(state.clone())).await.unwrap();
        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, NoticeKind::Event);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, NoticeKind::NewYear);
        assert_eq!(
            second.message,
            "Welcome to Year 2! Keep building your energy grid."
        );
    }
}
