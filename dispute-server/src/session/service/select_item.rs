use {
    super::{
        worker::SessionCommand,
        Service,
    },
    crate::{
        api::RestError,
        kernel::entities::{
            ItemId,
            ParticipantId,
            TenderId,
        },
    },
};

#[derive(Debug, Clone)]
pub struct SelectItemInput {
    pub tender_id: TenderId,
    pub caller_id: ParticipantId,
    pub item_id:   ItemId,
}

impl Service {
    /// Opens an item for bids. Auctioneer-only; at most one item is under
    /// dispute at a time. The first selection takes the session live.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(
        tender_id = %input.tender_id,
        item_id = %input.item_id,
    ))]
    pub async fn select_item(&self, input: SelectItemInput) -> Result<(), RestError> {
        let commands = self.get(&input.tender_id)?;
        self.request(commands, &input.tender_id, |respond_to| {
            SessionCommand::SelectItem {
                caller_id: input.caller_id.clone(),
                item_id: input.item_id,
                respond_to,
            }
        })
        .await?
    }
}
