use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::TenderId,
        session::entities,
    },
    dispute_api_types::session::{
        DisputeMode,
        ItemStatus,
    },
};

/// Master data of a tender as the engine needs it: the configured dispute
/// mode and the items up for dispute, in tender order.
#[derive(Debug)]
pub struct TenderDispute {
    pub mode:  DisputeMode,
    pub items: Vec<entities::Item>,
}

impl Repository {
    pub async fn get_tender(
        &self,
        tender_id: &TenderId,
    ) -> Result<Option<TenderDispute>, RestError> {
        let Some(tender) = self.db.get_tender(tender_id).await? else {
            return Ok(None);
        };
        let items = self
            .db
            .get_tender_items(tender_id)
            .await?
            .into_iter()
            .map(|row| {
                let mut item = entities::Item::new(
                    row.id,
                    row.number,
                    row.description,
                    row.quantity,
                    row.unit,
                    row.reference_value,
                );
                // An item with a recorded winner was closed in an earlier
                // run; it must never reopen.
                if let Some(winning_bid_id) = row.winning_bid_id {
                    item.status = ItemStatus::Closed;
                    item.winning_bid_id = Some(winning_bid_id);
                }
                item
            })
            .collect();
        Ok(Some(TenderDispute {
            mode: tender.mode.into(),
            items,
        }))
    }
}
