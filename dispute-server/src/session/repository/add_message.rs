use {
    super::{
        models,
        Repository,
    },
    crate::{
        api::RestError,
        kernel::entities::TenderId,
    },
    dispute_api_types::session::Message,
};

impl Repository {
    pub async fn add_message(
        &self,
        tender_id: &TenderId,
        message: &Message,
    ) -> Result<(), RestError> {
        let row = models::ChatMessage {
            id:        message.id,
            tender_id: tender_id.clone(),
            kind:      message.kind.into(),
            sender:    message.sender.clone(),
            text:      message.text.clone(),
            sent_at:   message.timestamp,
        };
        self.db.add_message(&row).await
    }
}
