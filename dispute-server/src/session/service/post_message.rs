use {
    super::{
        worker::SessionCommand,
        Service,
    },
    crate::{
        api::RestError,
        kernel::entities::{
            ParticipantId,
            TenderId,
        },
    },
    dispute_api_types::session::Message,
};

#[derive(Debug, Clone)]
pub struct PostMessageInput {
    pub tender_id: TenderId,
    pub sender_id: ParticipantId,
    pub text:      String,
}

impl Service {
    /// Posts a chat message to the room. Suppliers are published under their
    /// masked display name; auctioneer messages are flagged as such.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(tender_id = %input.tender_id))]
    pub async fn post_message(&self, input: PostMessageInput) -> Result<Message, RestError> {
        if input.text.trim().is_empty() {
            return Err(RestError::BadParameters(
                "Message text must not be empty".to_string(),
            ));
        }
        let commands = self.get(&input.tender_id)?;
        self.request(commands, &input.tender_id, |respond_to| {
            SessionCommand::PostMessage {
                sender_id: input.sender_id.clone(),
                text: input.text.clone(),
                respond_to,
            }
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            api::ws::UpdateEvent,
            session::service::tests::{
                join,
                test_service,
                TENDER,
            },
        },
        dispute_api_types::session::{
            MessageKind,
            ParticipantRole,
        },
    };

    #[tokio::test]
    async fn supplier_messages_are_published_under_the_masked_name() {
        let service = test_service();
        let mut observer = join(&service, "auctioneer-1", "Maria", ParticipantRole::Auctioneer).await;
        join(&service, "supplier-1", "Fornecedora Alfa", ParticipantRole::Supplier).await;

        let message = service
            .post_message(PostMessageInput {
                tender_id: TENDER.to_string(),
                sender_id: "supplier-1".to_string(),
                text:      "Requesting clarification on item 1".to_string(),
            })
            .await
            .expect("message should be accepted");
        assert_eq!(message.kind, MessageKind::Supplier);
        assert_eq!(message.sender, "For***");

        let mut delivered = false;
        while let Ok(event) = observer.events.try_recv() {
            if let UpdateEvent::NewMessage(received) = event {
                if received.id == message.id {
                    delivered = true;
                }
            }
        }
        assert!(delivered);
    }

    #[tokio::test]
    async fn messages_require_a_joined_sender_and_text() {
        let service = test_service();
        join(&service, "auctioneer-1", "Maria", ParticipantRole::Auctioneer).await;
        assert!(matches!(
            service
                .post_message(PostMessageInput {
                    tender_id: TENDER.to_string(),
                    sender_id: "ghost".to_string(),
                    text:      "hello".to_string(),
                })
                .await,
            Err(RestError::BadParameters(_))
        ));
        assert!(matches!(
            service
                .post_message(PostMessageInput {
                    tender_id: TENDER.to_string(),
                    sender_id: "auctioneer-1".to_string(),
                    text:      "   ".to_string(),
                })
                .await,
            Err(RestError::BadParameters(_))
        ));
    }
}
