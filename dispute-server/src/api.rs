use {
    crate::{
        config::RunOptions,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
    },
    anyhow::Result,
    axum::{
        http::StatusCode,
        response::{
            IntoResponse,
            Response,
        },
        routing::get,
        Json,
        Router,
    },
    clap::crate_version,
    dispute_api_types::{
        bid,
        session,
        ws as ws_types,
        ErrorBodyResponse,
        Route,
    },
    std::sync::{
        atomic::Ordering,
        Arc,
    },
    tower_http::cors::CorsLayer,
    utoipa::OpenApi,
    utoipa_redoc::{
        Redoc,
        Servable,
    },
};

async fn root() -> String {
    format!("Tender Dispute Server API {}", crate_version!())
}

pub mod rest;
pub mod ws;

#[derive(Debug)]
pub enum RestError {
    /// The request contained invalid parameters
    BadParameters(String),
    /// The bid does not improve on the current best active offer
    NotAnImprovement(String),
    /// The session or item is not in a state that allows the operation
    InvalidPhase(String),
    /// The caller is not allowed to perform the operation
    Unauthorized,
    /// The tender is not known to the platform
    TenderNotFound,
    /// No live session exists for the tender
    SessionNotFound,
    /// The item was not found in the session
    ItemNotFound,
    /// The bid was not found or is already cancelled
    BidNotFound,
    /// The operation conflicts with the current dispute state
    Conflict(String),
    /// The client has too many open websocket connections
    TooManyOpenWebsocketConnections,
    /// Internal error occurred during processing the request
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::NotAnImprovement(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            RestError::InvalidPhase(msg) => (StatusCode::CONFLICT, msg.clone()),
            RestError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "The caller is not allowed to perform this operation".to_string(),
            ),
            RestError::TenderNotFound => (
                StatusCode::NOT_FOUND,
                "Tender with the specified id was not found".to_string(),
            ),
            RestError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "No dispute session exists for the specified tender".to_string(),
            ),
            RestError::ItemNotFound => (
                StatusCode::NOT_FOUND,
                "Item with the specified id was not found".to_string(),
            ),
            RestError::BidNotFound => (
                StatusCode::NOT_FOUND,
                "Bid with the specified id was not found or is already cancelled".to_string(),
            ),
            RestError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            RestError::TooManyOpenWebsocketConnections => (
                StatusCode::TOO_MANY_REQUESTS,
                "Maximum number of websocket connections reached".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl std::fmt::Display for RestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_status_and_message().1)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

pub async fn start_api(run_options: RunOptions, store: Arc<Store>) -> Result<()> {
    // Make sure functions included in the paths section have distinct names, otherwise some api generators will fail
    #[derive(OpenApi)]
    #[openapi(
    paths(
    rest::get_session,
    rest::delete_session,
    ),
    components(
    schemas(
    bid::Bid,
    bid::BidCreate,
    bid::BidCancel,
    bid::BidStatus,
    session::SessionSnapshot,
    session::SessionPhase,
    session::DisputeMode,
    session::Item,
    session::ItemStatus,
    session::ClockStatus,
    session::Participant,
    session::ParticipantRole,
    session::Message,
    session::MessageKind,
    session::PhaseChange,
    session::RoomJoin,
    session::ItemSelect,
    session::SessionSuspend,
    session::SessionResume,
    session::ChatPost,
    ws_types::ClientRequest,
    ws_types::ClientMessage,
    ws_types::ServerResultMessage,
    ws_types::ServerResultResponse,
    ws_types::ServerUpdateResponse,
    ws_types::APIResponse,
    ErrorBodyResponse,
    ),
    responses(
    ErrorBodyResponse,
    session::SessionSnapshot,
    ),
    ),
    tags(
    (name = "Tender Dispute Server", description = "The dispute server runs the live reverse-auction rooms of the \
    bidding platform. Suppliers exchange successively lower offers against a shared ranking while the auctioneer \
    steers the session; every accepted bid is durably recorded before it is announced.")
    )
    )]
    struct ApiDoc;

    let v1_routes = Router::new().nest(
        Route::V1.as_ref(),
        Router::new()
            .route(
                Route::Session.as_ref(),
                get(rest::get_session).delete(rest::delete_session),
            )
            .route(Route::Ws.as_ref(), get(ws::ws_route_handler)),
    );

    let app: Router<()> = Router::new()
        .merge(Redoc::with_url(Route::Docs.as_ref(), ApiDoc::openapi()))
        .merge(v1_routes)
        .route(Route::Root.as_ref(), get(root))
        .route(Route::Liveness.as_ref(), get(live))
        .layer(CorsLayer::permissive())
        .with_state(store);

    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!(address = %run_options.server.listen_addr, "Dispute server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down API server...");
        })
        .await?;
    Ok(())
}
