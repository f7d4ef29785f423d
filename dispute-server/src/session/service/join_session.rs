use {
    super::{
        worker::{
            JoinOutcome,
            SessionCommand,
        },
        Service,
    },
    crate::{
        api::RestError,
        kernel::entities::{
            ParticipantId,
            TenderId,
        },
    },
    dispute_api_types::session::ParticipantRole,
};

#[derive(Debug, Clone)]
pub struct JoinSessionInput {
    pub tender_id:      TenderId,
    pub participant_id: ParticipantId,
    pub display_name:   String,
    pub role:           ParticipantRole,
}

impl Service {
    /// Enters a participant into the tender's room, creating the session on
    /// first join. Returns the snapshot together with the delta subscription
    /// taken in the same serialized step. Idempotent on reconnect.
    #[tracing::instrument(skip_all, fields(tender_id = %input.tender_id, participant_id = %input.participant_id))]
    pub async fn join_session(&self, input: JoinSessionInput) -> Result<JoinOutcome, RestError> {
        if input.display_name.trim().is_empty() {
            return Err(RestError::BadParameters(
                "A display name is required".to_string(),
            ));
        }
        let commands = self.get_or_create(&input.tender_id).await?;
        self.request(commands, &input.tender_id, |respond_to| {
            SessionCommand::Join {
                participant_id: input.participant_id.clone(),
                display_name: input.display_name.clone(),
                role: input.role,
                respond_to,
            }
        })
        .await
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
                open_item_one,
                submit,
                test_service,
                TENDER,
            },
        },
        dispute_api_types::session::SessionPhase,
        std::collections::HashSet,
        uuid::Uuid,
    };

    #[tokio::test]
    async fn first_join_creates_the_session_in_awaiting_phase() {
        let service = test_service();
        let outcome = join(&service, "supplier-1", "Fornecedora Alfa", ParticipantRole::Supplier).await;
        assert_eq!(outcome.snapshot.phase, SessionPhase::Awaiting);
        assert_eq!(outcome.snapshot.items.len(), 2);
        assert_eq!(outcome.snapshot.participants.len(), 1);
        assert_eq!(outcome.snapshot.participants[0].display_name, "For***");
    }

    #[tokio::test]
    async fn concurrent_first_joins_share_one_session() {
        let service = test_service();
        let (a, b) = tokio::join!(
            service.join_session(JoinSessionInput {
                tender_id:      TENDER.to_string(),
                participant_id: "supplier-1".to_string(),
                display_name:   "Fornecedora Alfa".to_string(),
                role:           ParticipantRole::Supplier,
            }),
            service.join_session(JoinSessionInput {
                tender_id:      TENDER.to_string(),
                participant_id: "supplier-2".to_string(),
                display_name:   "Fornecedora Beta".to_string(),
                role:           ParticipantRole::Supplier,
            }),
        );
        a.expect("first join should succeed");
        b.expect("second join should succeed");
        // Both participants landed in the same session object.
        let late = join(&service, "supplier-3", "Gama", ParticipantRole::Supplier).await;
        assert_eq!(late.snapshot.participants.len(), 3);
    }

    #[tokio::test]
    async fn rejoining_marks_the_same_participant_online() {
        let service = test_service();
        join(&service, "supplier-1", "Fornecedora Alfa", ParticipantRole::Supplier).await;
        let outcome = join(&service, "supplier-1", "Fornecedora Alfa", ParticipantRole::Supplier).await;
        assert_eq!(outcome.snapshot.participants.len(), 1);
        assert!(outcome.snapshot.participants[0].online);
    }

    #[tokio::test]
    async fn rebuilds_ranking_from_the_durable_log() {
        use crate::session::{
            repository::models,
            service::{
                tests::{
                    item_id,
                    mock_database_with_bids,
                    test_config,
                },
                Service,
            },
        };

        let logged = vec![
            models::Bid {
                id:            Uuid::from_u128(101),
                tender_id:     TENDER.to_string(),
                item_id:       item_id(1),
                supplier_id:   "supplier-9".to_string(),
                display_name:  "Gam***".to_string(),
                value:         rust_decimal::Decimal::from(100),
                sequence:      1,
                status:        models::BidStatus::Active,
                cancel_reason: None,
                submitted_at:  time::OffsetDateTime::UNIX_EPOCH,
            },
            models::Bid {
                id:            Uuid::from_u128(102),
                tender_id:     TENDER.to_string(),
                item_id:       item_id(1),
                supplier_id:   "supplier-9".to_string(),
                display_name:  "Gam***".to_string(),
                value:         rust_decimal::Decimal::from(90),
                sequence:      2,
                status:        models::BidStatus::Active,
                cancel_reason: None,
                submitted_at:  time::OffsetDateTime::UNIX_EPOCH,
            },
        ];
        let service = Service::new(mock_database_with_bids(logged), test_config());

        let outcome = open_item_one(&service).await;
        assert_eq!(outcome.snapshot.items[0].bids.len(), 2);
        join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;

        // The restored ranking is authoritative: 95 does not beat the logged
        // best of 90, and the sequence counter continues after the log.
        assert!(submit(&service, "supplier-1", 95).await.is_err());
        let accepted = submit(&service, "supplier-1", 80).await.expect("improvement");
        assert_eq!(accepted.sequence, 3);
    }

    // A late joiner must observe every accepted bid exactly once: bids from
    // before the join appear in the snapshot, bids from after arrive as
    // deltas, and the two sets never overlap.
    #[tokio::test]
    async fn snapshot_and_deltas_do_not_overlap() {
        let service = test_service();
        open_item_one(&service).await;
        join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;
        submit(&service, "supplier-1", 100).await.expect("bid accepted");
        submit(&service, "supplier-1", 90).await.expect("bid accepted");

        let mut outcome = join(&service, "supplier-2", "Beta", ParticipantRole::Supplier).await;
        let snapshot_bids: HashSet<Uuid> = outcome.snapshot.items[0]
            .bids
            .iter()
            .map(|bid| bid.id)
            .collect();
        assert_eq!(snapshot_bids.len(), 2);

        submit(&service, "supplier-2", 80).await.expect("bid accepted");
        submit(&service, "supplier-1", 70).await.expect("bid accepted");

        let mut delta_bids = HashSet::new();
        while let Ok(event) = outcome.events.try_recv() {
            if let UpdateEvent::NewBid(bid) = event {
                delta_bids.insert(bid.id);
            }
        }
        assert_eq!(delta_bids.len(), 2);
        assert!(snapshot_bids.is_disjoint(&delta_bids));
    }
}
