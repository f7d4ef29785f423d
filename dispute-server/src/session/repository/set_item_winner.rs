use {
    super::Repository,
    crate::kernel::entities::{
        BidId,
        ItemId,
    },
};

impl Repository {
    /// Records the winning bid of a closed item. This is the hand-off read
    /// by the downstream award/contract workflow.
    pub async fn set_item_winner(&self, item_id: ItemId, bid_id: BidId) -> anyhow::Result<()> {
        self.db.set_item_winner(item_id, bid_id).await
    }
}
