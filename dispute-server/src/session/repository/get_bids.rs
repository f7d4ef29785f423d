use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::TenderId,
    },
    dispute_api_types::bid::Bid,
};

impl Repository {
    /// Previously accepted bids of a tender, in per-item arrival order. Used
    /// to rebuild a session from the durable log.
    pub async fn get_bids(&self, tender_id: &TenderId) -> Result<Vec<Bid>, RestError> {
        let rows = self.db.get_bids(tender_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| Bid {
                id:            row.id,
                item_id:       row.item_id,
                supplier_id:   row.supplier_id,
                display_name:  row.display_name,
                value:         row.value,
                sequence:      row.sequence as u64,
                submitted_at:  row.submitted_at,
                status:        row.status.into(),
                cancel_reason: row.cancel_reason,
            })
            .collect())
    }
}
