use {
    super::{
        models,
        Repository,
    },
    crate::{
        api::RestError,
        kernel::entities::TenderId,
    },
    dispute_api_types::bid::Bid,
};

impl Repository {
    /// Appends an accepted bid to the audit log. The caller must not
    /// broadcast the bid until this returns Ok.
    pub async fn add_bid(&self, tender_id: &TenderId, bid: &Bid) -> Result<(), RestError> {
        let row = models::Bid {
            id:            bid.id,
            tender_id:     tender_id.clone(),
            item_id:       bid.item_id,
            supplier_id:   bid.supplier_id.clone(),
            display_name:  bid.display_name.clone(),
            value:         bid.value,
            sequence:      bid.sequence as i64,
            status:        bid.status.into(),
            cancel_reason: bid.cancel_reason.clone(),
            submitted_at:  bid.submitted_at,
        };
        self.db.add_bid(&row).await
    }
}
