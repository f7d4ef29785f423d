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
pub struct CloseItemInput {
    pub tender_id: TenderId,
    pub caller_id: ParticipantId,
    pub item_id:   ItemId,
}

impl Service {
    /// Manually closes the item under dispute, recording the best active
    /// offer as the winner. Closing the last item ends the session.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(
        tender_id = %input.tender_id,
        item_id = %input.item_id,
    ))]
    pub async fn close_item(&self, input: CloseItemInput) -> Result<(), RestError> {
        let commands = self.get(&input.tender_id)?;
        self.request(commands, &input.tender_id, |respond_to| {
            SessionCommand::CloseItem {
                caller_id: input.caller_id.clone(),
                item_id: input.item_id,
                respond_to,
            }
        })
        .await?
    }
}
