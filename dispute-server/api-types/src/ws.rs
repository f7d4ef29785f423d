use {
    crate::{
        bid::{
            Bid,
            BidCancel,
            BidCreate,
        },
        session::{
            ChatPost,
            ItemSelect,
            Message,
            Participant,
            PhaseChange,
            RoomJoin,
            SessionResume,
            SessionSnapshot,
            SessionSuspend,
        },
    },
    serde::{
        Deserialize,
        Serialize,
    },
    utoipa::ToSchema,
};

#[derive(Deserialize, Clone, ToSchema, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum ClientMessage {
    #[serde(rename = "join_room")]
    JoinRoom { join: RoomJoin },
    #[serde(rename = "submit_bid")]
    SubmitBid { bid: BidCreate },
    #[serde(rename = "cancel_bid")]
    CancelBid { data: BidCancel },
    #[serde(rename = "select_item")]
    SelectItem { data: ItemSelect },
    #[serde(rename = "close_item")]
    CloseItem { data: ItemSelect },
    #[serde(rename = "suspend_session")]
    SuspendSession { data: SessionSuspend },
    #[serde(rename = "resume_session")]
    ResumeSession { data: SessionResume },
    #[serde(rename = "chat_message")]
    ChatMessage { data: ChatPost },
}

#[derive(Deserialize, Clone, ToSchema, Serialize)]
pub struct ClientRequest {
    pub id:  String,
    #[serde(flatten)]
    pub msg: ClientMessage,
}

/// This enum is used to push a state delta to every subscriber of a room.
#[derive(Serialize, Clone, ToSchema, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerUpdateResponse {
    #[serde(rename = "new_bid")]
    NewBid { bid: Bid },
    #[serde(rename = "bid_cancelled")]
    BidCancelled { bid: Bid },
    #[serde(rename = "new_message")]
    NewMessage { message: Message },
    #[serde(rename = "presence_update")]
    PresenceUpdate { participant: Participant },
    #[serde(rename = "phase_change")]
    PhaseChange { update: PhaseChange },
}

#[derive(Serialize, Clone, ToSchema, Deserialize, Debug)]
#[serde(untagged)]
pub enum APIResponse {
    Bid(Bid),
    Snapshot(SessionSnapshot),
}

#[derive(Serialize, Clone, ToSchema, Deserialize, Debug)]
#[serde(tag = "status", content = "result")]
pub enum ServerResultMessage {
    #[serde(rename = "success")]
    Success(Option<APIResponse>),
    #[serde(rename = "error")]
    Err(String),
}

/// This enum is used to send the result for a specific client request with
/// the same id. Id is only None when the client message is invalid.
#[derive(Serialize, ToSchema, Deserialize, Clone, Debug)]
pub struct ServerResultResponse {
    pub id:     Option<String>,
    #[serde(flatten)]
    pub result: ServerResultMessage,
}
