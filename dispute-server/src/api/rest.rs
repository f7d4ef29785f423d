use {
    super::RestError,
    crate::{
        session::service::{
            get_snapshot::GetSnapshotInput,
            remove_session::RemoveSessionInput,
        },
        state::Store,
    },
    axum::{
        extract::{
            Path,
            State,
        },
        http::StatusCode,
        response::IntoResponse,
        Json,
    },
    axum_extra::{
        headers::{
            authorization::Bearer,
            Authorization,
        },
        TypedHeader,
    },
    dispute_api_types::{
        session::SessionSnapshot,
        ErrorBodyResponse,
        TenderId,
    },
    std::sync::Arc,
};

/// Current state of a tender's dispute room.
///
/// Read-only view produced through the same serialized path as every
/// mutation; it never creates a session.
#[utoipa::path(get, path = "/v1/sessions/{tender_id}",
    params(("tender_id" = String, Path, description = "Tender whose room to inspect")),
    responses(
        (status = 200, description = "The room snapshot", body = SessionSnapshot),
        (status = 404, description = "No session exists for the tender", body = ErrorBodyResponse),
    ),
)]
pub async fn get_session(
    State(store): State<Arc<Store>>,
    Path(tender_id): Path<TenderId>,
) -> Result<Json<SessionSnapshot>, RestError> {
    let snapshot = store
        .sessions
        .get_snapshot(GetSnapshotInput { tender_id })
        .await?;
    Ok(Json(snapshot))
}

/// Administrative removal of a dispute room.
///
/// Requires the admin bearer key. Connected participants lose their delta
/// stream and must rejoin; the durable log is untouched.
#[utoipa::path(delete, path = "/v1/sessions/{tender_id}",
    security(("bearerAuth" = [])),
    params(("tender_id" = String, Path, description = "Tender whose room to remove")),
    responses(
        (status = 204, description = "Session removed"),
        (status = 403, description = "Invalid admin key", body = ErrorBodyResponse),
        (status = 404, description = "No session exists for the tender", body = ErrorBodyResponse),
    ),
)]
pub async fn delete_session(
    State(store): State<Arc<Store>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(tender_id): Path<TenderId>,
) -> Result<impl IntoResponse, RestError> {
    if auth.token() != store.admin_key {
        return Err(RestError::Unauthorized);
    }
    store
        .sessions
        .remove_session(RemoveSessionInput { tender_id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
