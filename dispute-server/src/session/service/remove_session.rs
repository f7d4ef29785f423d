use {
    super::Service,
    crate::{
        api::RestError,
        kernel::entities::TenderId,
    },
};

#[derive(Debug, Clone)]
pub struct RemoveSessionInput {
    pub tender_id: TenderId,
}

impl Service {
    /// Administrative teardown of a room. Dropping the handle ends the
    /// session worker once in-flight commands drain; connected subscribers
    /// lose their delta stream and must rejoin. The durable log is kept.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(tender_id = %input.tender_id))]
    pub async fn remove_session(&self, input: RemoveSessionInput) -> Result<(), RestError> {
        self.sessions
            .remove(&input.tender_id)
            .map(|_| ())
            .ok_or(RestError::SessionNotFound)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::session::service::{
            get_snapshot::GetSnapshotInput,
            tests::{
                join,
                test_service,
                TENDER,
            },
        },
        dispute_api_types::session::ParticipantRole,
    };

    #[tokio::test]
    async fn removal_forgets_the_room_until_the_next_join() {
        let service = test_service();
        join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;
        service
            .remove_session(RemoveSessionInput {
                tender_id: TENDER.to_string(),
            })
            .await
            .expect("removal should succeed");
        assert!(matches!(
            service
                .get_snapshot(GetSnapshotInput {
                    tender_id: TENDER.to_string(),
                })
                .await,
            Err(RestError::SessionNotFound)
        ));
        assert!(matches!(
            service
                .remove_session(RemoveSessionInput {
                    tender_id: TENDER.to_string(),
                })
                .await,
            Err(RestError::SessionNotFound)
        ));
        // A later join recreates the room from master data and the log.
        let outcome = join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;
        assert_eq!(outcome.snapshot.tender_id, TENDER);
    }
}
