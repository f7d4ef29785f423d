use {
    super::{
        verification,
        worker::SessionCommand,
        Service,
    },
    crate::{
        api::RestError,
        kernel::entities::{
            ItemId,
            SupplierId,
            TenderId,
        },
    },
    dispute_api_types::bid::Bid,
    rust_decimal::Decimal,
};

#[derive(Debug, Clone)]
pub struct SubmitBidInput {
    pub tender_id:   TenderId,
    pub supplier_id: SupplierId,
    pub item_id:     ItemId,
    pub value:       Decimal,
}

impl Service {
    /// Proposes a new offer. Validation against the current best and the
    /// session phase happens inside the session worker, serialized with
    /// every other mutation, so two racing bids are judged one after the
    /// other against the ranking the earlier one produced.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(
        tender_id = %input.tender_id,
        supplier_id = %input.supplier_id,
        item_id = %input.item_id,
    ))]
    pub async fn submit_bid(&self, input: SubmitBidInput) -> Result<Bid, RestError> {
        verification::ensure_positive_value(input.value)?;
        let commands = self.get(&input.tender_id)?;
        self.request(commands, &input.tender_id, |respond_to| {
            SessionCommand::SubmitBid {
                supplier_id: input.supplier_id.clone(),
                item_id: input.item_id,
                value: input.value,
                respond_to,
            }
        })
        .await?
    }
}
