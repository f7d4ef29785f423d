use {
    crate::{
        SupplierId,
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

pub type BidId = Uuid;
pub type ItemId = Uuid;

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Active,
    Cancelled,
}

/// A price offer as shown to every participant of the room.
///
/// The supplier's identity is masked in `display_name`; `supplier_id` is the
/// opaque identifier clients use to recognize their own bids.
#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct Bid {
    #[schema(example = "b7f0c3a2-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:            BidId,
    #[schema(value_type = String)]
    pub item_id:       ItemId,
    pub supplier_id:   SupplierId,
    pub display_name:  String,
    /// Unit price offered, strictly positive.
    #[schema(example = "4450.00", value_type = String)]
    pub value:         Decimal,
    /// Arrival order within the item, assigned by the server.
    pub sequence:      u64,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub submitted_at:  OffsetDateTime,
    pub status:        BidStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct BidCreate {
    pub tender_id:   TenderId,
    #[schema(value_type = String)]
    pub item_id:     ItemId,
    pub supplier_id: SupplierId,
    #[schema(example = "4450.00", value_type = String)]
    pub value:       Decimal,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct BidCancel {
    pub tender_id: TenderId,
    #[schema(value_type = String)]
    pub bid_id:    BidId,
    /// Justification recorded in the audit trail and announced in the room.
    pub reason:    String,
}
