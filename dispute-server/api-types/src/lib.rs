use {
    ::serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

pub mod bid;
pub mod session;
pub mod ws;

/// Identifier of a tender; one dispute room exists per tender.
pub type TenderId = String;
/// Identifier of a supplier as assigned by the registration module.
pub type SupplierId = String;
/// Identifier of a room participant (supplier or auctioneer).
pub type ParticipantId = String;

#[derive(ToResponse, ToSchema, Serialize, Deserialize)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    pub error: String,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "v1")]
    V1,
    #[strum(serialize = "sessions/:tender_id")]
    Session,
    #[strum(serialize = "ws")]
    Ws,
    #[strum(serialize = "")]
    Root,
    #[strum(serialize = "live")]
    Liveness,
    #[strum(serialize = "docs")]
    Docs,
}
