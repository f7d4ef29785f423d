pub use dispute_api_types::{
    bid::{
        BidId,
        ItemId,
    },
    ParticipantId,
    SupplierId,
    TenderId,
};

/// Arrival order of a bid within one item. Assigned by the session worker,
/// strictly monotonic per item.
pub type Sequence = u64;
