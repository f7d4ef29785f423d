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
};

#[derive(Debug, Clone)]
pub struct ResumeSessionInput {
    pub tender_id: TenderId,
    pub caller_id: ParticipantId,
}

impl Service {
    /// Resumes a suspended session. An item that was under dispute restarts
    /// from a fresh quiet period; a previously sampled random window is
    /// discarded.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(tender_id = %input.tender_id))]
    pub async fn resume_session(&self, input: ResumeSessionInput) -> Result<(), RestError> {
        let commands = self.get(&input.tender_id)?;
        self.request(commands, &input.tender_id, |respond_to| {
            SessionCommand::Resume {
                caller_id: input.caller_id.clone(),
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
        crate::session::service::{
            suspend_session::SuspendSessionInput,
            tests::{
                item_id,
                join,
                open_item_one,
                test_service,
                TENDER,
            },
        },
        dispute_api_types::session::{
            ItemStatus,
            ParticipantRole,
        },
    };

    #[tokio::test]
    async fn resume_restarts_the_quiet_period_on_the_open_item() {
        let service = test_service();
        open_item_one(&service).await;
        service
            .suspend_session(SuspendSessionInput {
                tender_id: TENDER.to_string(),
                caller_id: "auctioneer-1".to_string(),
                reason:    "connectivity check".to_string(),
            })
            .await
            .expect("suspend");
        service
            .resume_session(ResumeSessionInput {
                tender_id: TENDER.to_string(),
                caller_id: "auctioneer-1".to_string(),
            })
            .await
            .expect("resume");

        let observer = join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;
        let clock = observer.snapshot.clock.expect("clock restarted on resume");
        assert_eq!(clock.item_id, item_id(1));
        assert_eq!(clock.status, ItemStatus::Open);
    }

    #[tokio::test]
    async fn resuming_a_live_session_is_a_phase_error() {
        let service = test_service();
        open_item_one(&service).await;
        assert!(matches!(
            service
                .resume_session(ResumeSessionInput {
                    tender_id: TENDER.to_string(),
                    caller_id: "auctioneer-1".to_string(),
                })
                .await,
            Err(RestError::InvalidPhase(_))
        ));
    }
}
