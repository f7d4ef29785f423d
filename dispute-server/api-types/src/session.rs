use {
    crate::{
        bid::{
            Bid,
            BidId,
            ItemId,
        },
        ParticipantId,
        TenderId,
    },
    rust_decimal::Decimal,
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Awaiting,
    Live,
    Suspended,
    Closed,
}

/// How bids are disclosed during the dispute, per the tender rules.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisputeMode {
    Open,
    OpenClosed,
    Closed,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Open,
    InRandomClose,
    Closed,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Auctioneer,
    Supplier,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Auctioneer,
    Supplier,
    System,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct Participant {
    pub id:           ParticipantId,
    /// Masked for suppliers; auctioneers are shown as-is.
    pub display_name: String,
    pub role:         ParticipantRole,
    pub online:       bool,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct Message {
    #[schema(value_type = String)]
    pub id:        Uuid,
    pub kind:      MessageKind,
    pub sender:    String,
    pub text:      String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub timestamp: OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct Item {
    #[schema(value_type = String)]
    pub id:              ItemId,
    pub number:          i32,
    pub description:     String,
    #[schema(example = "50", value_type = String)]
    pub quantity:        Decimal,
    pub unit:            String,
    #[schema(example = "4500.00", value_type = String)]
    pub reference_value: Decimal,
    pub status:          ItemStatus,
    /// Full bid history in arrival order, cancelled bids included.
    pub bids:            Vec<Bid>,
    /// Ids of the active bids in ranking order, best offer first.
    #[schema(value_type = Vec<String>)]
    pub ranking:         Vec<BidId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub winning_bid_id:  Option<BidId>,
}

/// Countdown state of the item currently under dispute.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct ClockStatus {
    #[schema(value_type = String)]
    pub item_id:  ItemId,
    /// `open` while the quiet period runs, `in_random_close` afterwards.
    pub status:   ItemStatus,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub deadline: OffsetDateTime,
}

/// Complete state of a dispute room, sent to joining or reconnecting
/// participants. Deltas received after the snapshot never overlap with it.
#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub tender_id:       TenderId,
    pub phase:           SessionPhase,
    pub mode:            DisputeMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub current_item_id: Option<ItemId>,
    pub items:           Vec<Item>,
    pub participants:    Vec<Participant>,
    pub messages:        Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock:           Option<ClockStatus>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct PhaseChange {
    pub session_phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub item_id:       Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_status:   Option<ItemStatus>,
    /// Set when an item closes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner:        Option<Bid>,
    /// Wall-clock deadline of the running closing clock, for countdowns.
    #[serde(with = "time::serde::rfc3339::option", default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub deadline:      Option<OffsetDateTime>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct RoomJoin {
    pub tender_id:      TenderId,
    pub participant_id: ParticipantId,
    pub display_name:   String,
    pub role:           ParticipantRole,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct ItemSelect {
    pub tender_id: TenderId,
    #[schema(value_type = String)]
    pub item_id:   ItemId,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct SessionSuspend {
    pub tender_id: TenderId,
    pub reason:    String,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct SessionResume {
    pub tender_id: TenderId,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct ChatPost {
    pub tender_id: TenderId,
    pub text:      String,
}
