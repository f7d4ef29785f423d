use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::BidId,
    },
    time::OffsetDateTime,
};

impl Repository {
    pub async fn cancel_bid(
        &self,
        bid_id: BidId,
        reason: &str,
        cancelled_at: OffsetDateTime,
    ) -> Result<(), RestError> {
        self.db.cancel_bid(bid_id, reason, cancelled_at).await
    }
}
