use {
    super::{
        verification,
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
pub struct SuspendSessionInput {
    pub tender_id: TenderId,
    pub caller_id: ParticipantId,
    pub reason:    String,
}

impl Service {
    /// Suspends a live session: all clocks stop and bids are rejected until
    /// the auctioneer resumes.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(tender_id = %input.tender_id))]
    pub async fn suspend_session(&self, input: SuspendSessionInput) -> Result<(), RestError> {
        verification::ensure_reason(&input.reason)?;
        let commands = self.get(&input.tender_id)?;
        self.request(commands, &input.tender_id, |respond_to| {
            SessionCommand::Suspend {
                caller_id: input.caller_id.clone(),
                reason: input.reason.clone(),
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
            resume_session::ResumeSessionInput,
            tests::{
                join,
                open_item_one,
                submit,
                test_service,
                TENDER,
            },
        },
        dispute_api_types::session::{
            ParticipantRole,
            SessionPhase,
        },
    };

    fn suspend(caller: &str, reason: &str) -> SuspendSessionInput {
        SuspendSessionInput {
            tender_id: TENDER.to_string(),
            caller_id: caller.to_string(),
            reason:    reason.to_string(),
        }
    }

    #[tokio::test]
    async fn suspension_rejects_bids_until_resumed() {
        let service = test_service();
        open_item_one(&service).await;
        join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;
        submit(&service, "supplier-1", 100).await.expect("accepted");

        service
            .suspend_session(suspend("auctioneer-1", "system maintenance"))
            .await
            .expect("suspension should succeed");
        assert!(matches!(
            submit(&service, "supplier-1", 90).await,
            Err(RestError::InvalidPhase(_))
        ));
        let observer = join(&service, "supplier-2", "Beta", ParticipantRole::Supplier).await;
        assert_eq!(observer.snapshot.phase, SessionPhase::Suspended);
        assert!(observer.snapshot.clock.is_none());

        service
            .resume_session(ResumeSessionInput {
                tender_id: TENDER.to_string(),
                caller_id: "auctioneer-1".to_string(),
            })
            .await
            .expect("resume should succeed");
        submit(&service, "supplier-1", 90).await.expect("accepted after resume");
    }

    #[tokio::test]
    async fn only_a_live_session_can_be_suspended() {
        let service = test_service();
        join(&service, "auctioneer-1", "Maria", ParticipantRole::Auctioneer).await;
        assert!(matches!(
            service.suspend_session(suspend("auctioneer-1", "too early")).await,
            Err(RestError::InvalidPhase(_))
        ));
    }

    #[tokio::test]
    async fn suspension_requires_the_auctioneer_and_a_reason() {
        let service = test_service();
        open_item_one(&service).await;
        join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;
        assert!(matches!(
            service.suspend_session(suspend("supplier-1", "I object")).await,
            Err(RestError::Unauthorized)
        ));
        assert!(matches!(
            service.suspend_session(suspend("auctioneer-1", " ")).await,
            Err(RestError::BadParameters(_))
        ));
    }
}
