use {
    super::{
        entities::Session,
        repository::{
            Database,
            Repository,
        },
    },
    crate::{
        api::RestError,
        config::DisputeConfig,
        kernel::entities::TenderId,
    },
    dashmap::DashMap,
    dispute_api_types::session::DisputeMode,
    std::sync::Arc,
    tokio::sync::{
        broadcast,
        mpsc,
        oneshot,
    },
    tokio_util::task::TaskTracker,
};

pub mod cancel_bid;
pub mod close_item;
pub mod get_snapshot;
pub mod join_session;
pub mod leave_session;
pub mod post_message;
pub mod remove_session;
pub mod resume_session;
pub mod select_item;
pub mod submit_bid;
pub mod suspend_session;
pub mod verification;
pub mod worker;

use self::worker::{
    SessionCommand,
    SessionWorker,
};

const COMMAND_CHANNEL_SIZE: usize = 256;

struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

pub struct ServiceInner {
    sessions:     DashMap<TenderId, SessionHandle>,
    repo:         Arc<Repository>,
    config:       DisputeConfig,
    task_tracker: TaskTracker,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(db: impl Database, config: DisputeConfig) -> Self {
        Self(Arc::new(ServiceInner {
            sessions: DashMap::new(),
            repo: Arc::new(Repository::new(db)),
            config,
            task_tracker: TaskTracker::new(),
        }))
    }

    pub fn task_tracker(&self) -> &TaskTracker {
        &self.task_tracker
    }

    /// Room lookup with create-on-first-join. Master data is read once, at
    /// creation; previously persisted bids are replayed so a session always
    /// restarts from its durable log. The dashmap entry guarantees a single
    /// worker per tender even when first joins race.
    #[tracing::instrument(skip_all, fields(tender_id = %tender_id))]
    pub(super) async fn get_or_create(
        &self,
        tender_id: &TenderId,
    ) -> Result<mpsc::Sender<SessionCommand>, RestError> {
        if let Some(handle) = self.sessions.get(tender_id) {
            return Ok(handle.commands.clone());
        }

        let dispute = self
            .repo
            .get_tender(tender_id)
            .await?
            .ok_or(RestError::TenderNotFound)?;
        if dispute.mode != DisputeMode::Open {
            // Visibility rules for sealed dispute modes are pending
            // confirmation against the governing tender rules.
            return Err(RestError::BadParameters(format!(
                "Dispute mode {:?} is not supported yet",
                dispute.mode
            )));
        }
        let mut session = Session::new(tender_id.clone(), dispute.mode, dispute.items);
        for bid in self.repo.get_bids(tender_id).await? {
            if let Some(item) = session.item_mut(bid.item_id) {
                item.restore_bid(bid);
            }
        }
        let restored = session.items.iter().any(|item| !item.bids.is_empty());
        if restored {
            tracing::info!(%tender_id, "Session rebuilt from the durable bid log");
        }

        let handle = self.sessions.entry(tender_id.clone()).or_insert_with(|| {
            let (commands, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            let (events, _) = broadcast::channel(self.config.broadcast_channel_size);
            let worker = SessionWorker::new(
                session,
                self.repo.clone(),
                self.config.clone(),
                command_rx,
                events,
            );
            self.task_tracker.spawn(worker.run());
            SessionHandle { commands }
        });
        Ok(handle.commands.clone())
    }

    pub(super) fn get(
        &self,
        tender_id: &TenderId,
    ) -> Result<mpsc::Sender<SessionCommand>, RestError> {
        self.sessions
            .get(tender_id)
            .map(|handle| handle.commands.clone())
            .ok_or(RestError::SessionNotFound)
    }

    /// Sends one command into the session's queue and awaits the reply. A
    /// dead worker (torn down after an invariant failure) is evicted so the
    /// next join rebuilds the session from the log.
    pub(super) async fn request<R>(
        &self,
        commands: mpsc::Sender<SessionCommand>,
        tender_id: &TenderId,
        make: impl FnOnce(oneshot::Sender<R>) -> SessionCommand,
    ) -> Result<R, RestError> {
        let (respond_to, response) = oneshot::channel();
        if commands.send(make(respond_to)).await.is_err() {
            self.sessions.remove(tender_id);
            return Err(RestError::TemporarilyUnavailable);
        }
        response.await.map_err(|_| {
            self.sessions.remove(tender_id);
            RestError::TemporarilyUnavailable
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use {
        super::{
            join_session::JoinSessionInput,
            select_item::SelectItemInput,
            submit_bid::SubmitBidInput,
            Service,
        },
        crate::{
            config::DisputeConfig,
            session::{
                repository::{
                    models,
                    MockDatabase,
                },
                service::worker::JoinOutcome,
            },
        },
        dispute_api_types::{
            bid::Bid,
            session::ParticipantRole,
        },
        rust_decimal::Decimal,
        std::time::Duration,
        uuid::Uuid,
    };

    pub(crate) const TENDER: &str = "PE-001-2026";

    pub(crate) fn item_id(number: i32) -> Uuid {
        Uuid::from_u128(number as u128)
    }

    fn tender_item(number: i32) -> models::TenderItem {
        models::TenderItem {
            id:              item_id(number),
            tender_id:       TENDER.to_string(),
            number,
            description:     format!("Item {number}"),
            quantity:        Decimal::from(50),
            unit:            "UN".to_string(),
            reference_value: Decimal::from(4500),
            winning_bid_id:  None,
        }
    }

    /// Mock with the write expectations shared by every fixture; the bid log
    /// starts out as given.
    pub(crate) fn mock_database_with_bids(bids: Vec<models::Bid>) -> MockDatabase {
        let mut db = MockDatabase::new();
        db.expect_get_tender().returning(|tender_id| {
            Ok(Some(models::Tender {
                id:     tender_id.to_string(),
                number: "PE 001/2026".to_string(),
                title:  "IT equipment".to_string(),
                mode:   models::DisputeMode::Open,
            }))
        });
        db.expect_get_tender_items()
            .returning(|_| Ok(vec![tender_item(1), tender_item(2)]));
        db.expect_get_bids().returning(move |_| Ok(bids.clone()));
        db.expect_add_bid().returning(|_| Ok(()));
        db.expect_cancel_bid().returning(|_, _, _| Ok(()));
        db.expect_add_message().returning(|_| Ok(()));
        db.expect_add_phase_transition().returning(|_| Ok(()));
        db.expect_set_item_winner().returning(|_, _| Ok(()));
        db
    }

    pub(crate) fn mock_database() -> MockDatabase {
        mock_database_with_bids(Vec::new())
    }

    pub(crate) fn test_config() -> DisputeConfig {
        DisputeConfig {
            quiet_period:           Duration::from_secs(120),
            random_window_max:      Duration::from_secs(1800),
            broadcast_channel_size: 64,
        }
    }

    pub(crate) fn test_service() -> Service {
        Service::new(mock_database(), test_config())
    }

    pub(crate) async fn join(
        service: &Service,
        participant_id: &str,
        display_name: &str,
        role: ParticipantRole,
    ) -> JoinOutcome {
        service
            .join_session(JoinSessionInput {
                tender_id:      TENDER.to_string(),
                participant_id: participant_id.to_string(),
                display_name:   display_name.to_string(),
                role,
            })
            .await
            .expect("join should succeed")
    }

    /// Joins the auctioneer and opens item 1 for bids.
    pub(crate) async fn open_item_one(service: &Service) -> JoinOutcome {
        let outcome = join(service, "auctioneer-1", "Maria Silva", ParticipantRole::Auctioneer).await;
        service
            .select_item(SelectItemInput {
                tender_id: TENDER.to_string(),
                caller_id: "auctioneer-1".to_string(),
                item_id:   item_id(1),
            })
            .await
            .expect("item selection should succeed");
        outcome
    }

    pub(crate) async fn submit(
        service: &Service,
        supplier_id: &str,
        value: i64,
    ) -> Result<Bid, crate::api::RestError> {
        service
            .submit_bid(SubmitBidInput {
                tender_id:   TENDER.to_string(),
                supplier_id: supplier_id.to_string(),
                item_id:     item_id(1),
                value:       Decimal::from(value),
            })
            .await
    }
}
