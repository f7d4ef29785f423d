use {
    super::{
        worker::SessionCommand,
        Service,
    },
    crate::{
        api::RestError,
        kernel::entities::TenderId,
    },
    dispute_api_types::session::SessionSnapshot,
};

#[derive(Debug, Clone)]
pub struct GetSnapshotInput {
    pub tender_id: TenderId,
}

impl Service {
    /// Read-only snapshot of a room, produced inside the same serialized
    /// step as every mutation. Does not create the session.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(tender_id = %input.tender_id))]
    pub async fn get_snapshot(&self, input: GetSnapshotInput) -> Result<SessionSnapshot, RestError> {
        let commands = self.get(&input.tender_id)?;
        self.request(commands, &input.tender_id, |respond_to| {
            SessionCommand::GetSnapshot { respond_to }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            api::RestError,
            session::service::tests::{
                join,
                test_service,
                TENDER,
            },
        },
        dispute_api_types::session::ParticipantRole,
    };

    #[tokio::test]
    async fn snapshot_requires_an_existing_session() {
        let service = test_service();
        assert!(matches!(
            service
                .get_snapshot(GetSnapshotInput {
                    tender_id: TENDER.to_string(),
                })
                .await,
            Err(RestError::SessionNotFound)
        ));
        join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;
        let snapshot = service
            .get_snapshot(GetSnapshotInput {
                tender_id: TENDER.to_string(),
            })
            .await
            .expect("snapshot after first join");
        assert_eq!(snapshot.tender_id, TENDER);
    }
}
