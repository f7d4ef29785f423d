use {
    super::verification,
    crate::{
        api::{
            ws::UpdateEvent,
            RestError,
        },
        config::DisputeConfig,
        kernel::entities::{
            BidId,
            ItemId,
            ParticipantId,
            SupplierId,
        },
        session::{
            entities::{
                best_active,
                mask_display_name,
                Session,
            },
            repository::Repository,
        },
    },
    dispute_api_types::{
        bid::{
            Bid,
            BidStatus,
        },
        session::{
            ClockStatus,
            ItemStatus,
            Message,
            MessageKind,
            Participant,
            ParticipantRole,
            PhaseChange,
            SessionPhase,
            SessionSnapshot,
        },
    },
    rand::Rng,
    rust_decimal::Decimal,
    std::{
        sync::Arc,
        time::Duration,
    },
    time::OffsetDateTime,
    tokio::{
        sync::{
            broadcast,
            mpsc,
            oneshot,
        },
        time::{
            sleep_until,
            Instant,
        },
    },
    uuid::Uuid,
};

/// Everything a newly joined participant needs: the snapshot and the delta
/// stream subscribed in the same worker step, so no event is missed or
/// duplicated relative to the snapshot boundary.
pub struct JoinOutcome {
    pub snapshot: SessionSnapshot,
    pub events:   broadcast::Receiver<UpdateEvent>,
}

pub enum SessionCommand {
    Join {
        participant_id: ParticipantId,
        display_name:   String,
        role:           ParticipantRole,
        respond_to:     oneshot::Sender<JoinOutcome>,
    },
    Disconnect {
        participant_id: ParticipantId,
    },
    GetSnapshot {
        respond_to: oneshot::Sender<SessionSnapshot>,
    },
    SubmitBid {
        supplier_id: SupplierId,
        item_id:     ItemId,
        value:       Decimal,
        respond_to:  oneshot::Sender<Result<Bid, RestError>>,
    },
    CancelBid {
        caller_id:  ParticipantId,
        bid_id:     BidId,
        reason:     String,
        respond_to: oneshot::Sender<Result<Bid, RestError>>,
    },
    SelectItem {
        caller_id:  ParticipantId,
        item_id:    ItemId,
        respond_to: oneshot::Sender<Result<(), RestError>>,
    },
    CloseItem {
        caller_id:  ParticipantId,
        item_id:    ItemId,
        respond_to: oneshot::Sender<Result<(), RestError>>,
    },
    Suspend {
        caller_id:  ParticipantId,
        reason:     String,
        respond_to: oneshot::Sender<Result<(), RestError>>,
    },
    Resume {
        caller_id:  ParticipantId,
        respond_to: oneshot::Sender<Result<(), RestError>>,
    },
    PostMessage {
        sender_id:  ParticipantId,
        text:       String,
        respond_to: oneshot::Sender<Result<Message, RestError>>,
    },
}

/// The running closing clock of the item under dispute. Which rule it is
/// counting down (quiet period or random window) follows from the item's
/// status: `Open` counts the quiet period, `InRandomClose` the sampled
/// window.
struct ClosingClock {
    item_id:       ItemId,
    deadline:      Instant,
    wall_deadline: OffsetDateTime,
}

/// Single consumer of one session's command queue. Owns the session state
/// exclusively: every mutation, timer expiry, and snapshot is processed here
/// in strict arrival order, so concurrent bids, control actions, and clock
/// expiries can never race.
pub(super) struct SessionWorker {
    session:  Session,
    repo:     Arc<Repository>,
    config:   DisputeConfig,
    commands: mpsc::Receiver<SessionCommand>,
    events:   broadcast::Sender<UpdateEvent>,
    clock:    Option<ClosingClock>,
}

impl SessionWorker {
    pub(super) fn new(
        session: Session,
        repo: Arc<Repository>,
        config: DisputeConfig,
        commands: mpsc::Receiver<SessionCommand>,
        events: broadcast::Sender<UpdateEvent>,
    ) -> Self {
        Self {
            session,
            repo,
            config,
            commands,
            events,
            clock: None,
        }
    }

    pub(super) async fn run(mut self) {
        tracing::info!(tender_id = %self.session.tender_id, "Session worker started");
        loop {
            let deadline = self.clock.as_ref().map(|clock| clock.deadline);
            tokio::select! {
                maybe_command = self.commands.recv() => {
                    match maybe_command {
                        Some(command) => self.handle_command(command).await,
                        None => break,
                    }
                }
                () = async {
                    match deadline {
                        Some(deadline) => sleep_until(deadline).await,
                        None => std::future::pending().await,
                    }
                } => {
                    self.handle_deadline().await;
                }
            }
            if let Err(err) = self.check_invariants() {
                tracing::error!(
                    tender_id = %self.session.tender_id,
                    error = %err,
                    "Session state inconsistency detected, tearing the worker down"
                );
                self.commands.close();
                break;
            }
        }
        tracing::info!(tender_id = %self.session.tender_id, "Session worker stopped");
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Join {
                participant_id,
                display_name,
                role,
                respond_to,
            } => {
                let outcome = self.join(participant_id, display_name, role);
                let _ = respond_to.send(outcome);
            }
            SessionCommand::Disconnect { participant_id } => self.disconnect(&participant_id),
            SessionCommand::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
            SessionCommand::SubmitBid {
                supplier_id,
                item_id,
                value,
                respond_to,
            } => {
                let result = self.submit_bid(supplier_id, item_id, value).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::CancelBid {
                caller_id,
                bid_id,
                reason,
                respond_to,
            } => {
                let result = self.cancel_bid(&caller_id, bid_id, reason).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::SelectItem {
                caller_id,
                item_id,
                respond_to,
            } => {
                let result = self.select_item(&caller_id, item_id).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::CloseItem {
                caller_id,
                item_id,
                respond_to,
            } => {
                let result = self.close_item(&caller_id, item_id).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::Suspend {
                caller_id,
                reason,
                respond_to,
            } => {
                let result = self.suspend(&caller_id, reason).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::Resume {
                caller_id,
                respond_to,
            } => {
                let result = self.resume(&caller_id).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::PostMessage {
                sender_id,
                text,
                respond_to,
            } => {
                let result = self.post_message(&sender_id, text).await;
                let _ = respond_to.send(result);
            }
        }
    }

    fn join(
        &mut self,
        participant_id: ParticipantId,
        display_name: String,
        role: ParticipantRole,
    ) -> JoinOutcome {
        let display_name = match role {
            ParticipantRole::Auctioneer => display_name,
            ParticipantRole::Supplier => mask_display_name(&display_name),
        };
        let participant = Participant {
            id: participant_id.clone(),
            display_name,
            role,
            online: true,
        };
        self.session
            .participants
            .insert(participant_id, participant.clone());
        self.publish(UpdateEvent::PresenceUpdate(participant));
        // Snapshot and subscription happen in this same step: deltas after
        // this point are exactly the events the snapshot does not contain.
        JoinOutcome {
            snapshot: self.snapshot(),
            events:   self.events.subscribe(),
        }
    }

    fn disconnect(&mut self, participant_id: &str) {
        if let Some(participant) = self.session.participants.get_mut(participant_id) {
            if participant.online {
                participant.online = false;
                let participant = participant.clone();
                self.publish(UpdateEvent::PresenceUpdate(participant));
            }
        }
    }

    async fn submit_bid(
        &mut self,
        supplier_id: SupplierId,
        item_id: ItemId,
        value: Decimal,
    ) -> Result<Bid, RestError> {
        verification::ensure_session_live(self.session.phase)?;
        let item = self.session.item(item_id).ok_or(RestError::ItemNotFound)?;
        verification::ensure_item_open(item.status)?;
        verification::ensure_improvement(best_active(item), value)?;

        let display_name = self.session.published_name(&supplier_id);
        let item = self
            .session
            .item_mut(item_id)
            .expect("item located above");
        let bid = Bid {
            id: Uuid::new_v4(),
            item_id,
            supplier_id,
            display_name,
            value,
            sequence: item.next_sequence(),
            submitted_at: OffsetDateTime::now_utc(),
            status: BidStatus::Active,
            cancel_reason: None,
        };

        // Durable first: the bid is only acknowledged and broadcast once the
        // audit log holds it.
        self.repo.add_bid(&self.session.tender_id, &bid).await?;

        let item = self
            .session
            .item_mut(item_id)
            .expect("item located above");
        let reopened = item.status == ItemStatus::InRandomClose;
        if reopened {
            item.status = ItemStatus::Open;
        }
        item.bids.push(bid.clone());

        self.arm_quiet_clock(item_id);
        self.publish(UpdateEvent::NewBid(bid.clone()));
        if reopened {
            self.audit(Some(item_id), "item_reopened", None).await;
            self.system_message(
                "New bid received during the random window: the item returned to open dispute."
                    .to_string(),
            )
            .await;
        }
        let deadline = self.clock.as_ref().map(|clock| clock.wall_deadline);
        self.publish(UpdateEvent::PhaseChange(PhaseChange {
            session_phase: self.session.phase,
            item_id: Some(item_id),
            item_status: Some(ItemStatus::Open),
            winner: None,
            deadline,
        }));
        Ok(bid)
    }

    async fn cancel_bid(
        &mut self,
        caller_id: &str,
        bid_id: BidId,
        reason: String,
    ) -> Result<Bid, RestError> {
        self.ensure_auctioneer(caller_id)?;
        let (item, bid) = self
            .session
            .find_bid(bid_id)
            .ok_or(RestError::BidNotFound)?;
        if bid.status == BidStatus::Cancelled {
            return Err(RestError::BidNotFound);
        }
        if item.status == ItemStatus::Closed {
            return Err(RestError::Conflict(
                "Bids of a closed item are immutable".to_string(),
            ));
        }
        let item_id = item.id;

        self.repo
            .cancel_bid(bid_id, &reason, OffsetDateTime::now_utc())
            .await?;

        let (_, bid) = self
            .session
            .find_bid_mut(bid_id)
            .expect("bid located above");
        bid.status = BidStatus::Cancelled;
        bid.cancel_reason = Some(reason.clone());
        let bid = bid.clone();

        self.audit(Some(item_id), "bid_cancelled", Some(&reason)).await;
        self.system_message(format!(
            "Bid of {} by {} cancelled by the auctioneer. Reason: {reason}",
            bid.value, bid.display_name
        ))
        .await;
        self.publish(UpdateEvent::BidCancelled(bid.clone()));
        Ok(bid)
    }

    async fn select_item(&mut self, caller_id: &str, item_id: ItemId) -> Result<(), RestError> {
        self.ensure_auctioneer(caller_id)?;
        if !matches!(
            self.session.phase,
            SessionPhase::Awaiting | SessionPhase::Live
        ) {
            return Err(RestError::InvalidPhase(format!(
                "Items cannot be selected while the session is {:?}",
                self.session.phase
            )));
        }
        if let Some(open) = self.session.open_item() {
            return Err(RestError::Conflict(format!(
                "Item {} is still under dispute",
                open.number
            )));
        }
        let item = self.session.item(item_id).ok_or(RestError::ItemNotFound)?;
        if item.status != ItemStatus::Pending {
            return Err(RestError::Conflict(format!(
                "Item {} has already been disputed",
                item.number
            )));
        }
        let number = item.number;

        if self.session.phase == SessionPhase::Awaiting {
            self.session.phase = SessionPhase::Live;
            self.audit(None, "session_live", None).await;
        }
        let item = self
            .session
            .item_mut(item_id)
            .expect("item located above");
        item.status = ItemStatus::Open;
        self.session.current_item_id = Some(item_id);
        self.arm_quiet_clock(item_id);

        self.audit(Some(item_id), "item_open", None).await;
        self.system_message(format!("Item {number} open for bids.")).await;
        let deadline = self.clock.as_ref().map(|clock| clock.wall_deadline);
        self.publish(UpdateEvent::PhaseChange(PhaseChange {
            session_phase: self.session.phase,
            item_id: Some(item_id),
            item_status: Some(ItemStatus::Open),
            winner: None,
            deadline,
        }));
        Ok(())
    }

    async fn close_item(&mut self, caller_id: &str, item_id: ItemId) -> Result<(), RestError> {
        self.ensure_auctioneer(caller_id)?;
        let item = self.session.item(item_id).ok_or(RestError::ItemNotFound)?;
        if !item.accepts_bids() {
            return Err(RestError::Conflict(format!(
                "Item {} is not under dispute",
                item.number
            )));
        }
        self.close_item_now(item_id, "closed by the auctioneer").await;
        Ok(())
    }

    async fn suspend(&mut self, caller_id: &str, reason: String) -> Result<(), RestError> {
        self.ensure_auctioneer(caller_id)?;
        if self.session.phase != SessionPhase::Live {
            return Err(RestError::InvalidPhase(format!(
                "Only a live session can be suspended (current phase: {:?})",
                self.session.phase
            )));
        }
        self.session.phase = SessionPhase::Suspended;
        self.clock = None;
        self.audit(None, "session_suspended", Some(&reason)).await;
        self.system_message(format!("Session suspended by the auctioneer. Reason: {reason}"))
            .await;
        self.publish(UpdateEvent::PhaseChange(PhaseChange {
            session_phase: SessionPhase::Suspended,
            item_id: self.session.current_item_id,
            item_status: self.current_item_status(),
            winner: None,
            deadline: None,
        }));
        Ok(())
    }

    async fn resume(&mut self, caller_id: &str) -> Result<(), RestError> {
        self.ensure_auctioneer(caller_id)?;
        if self.session.phase != SessionPhase::Suspended {
            return Err(RestError::InvalidPhase(format!(
                "Only a suspended session can be resumed (current phase: {:?})",
                self.session.phase
            )));
        }
        self.session.phase = SessionPhase::Live;
        // A sampled random window does not survive suspension: the open item
        // restarts from a fresh quiet period.
        let open_item = self.session.open_item().map(|item| (item.id, item.status));
        if let Some((item_id, status)) = open_item {
            if status == ItemStatus::InRandomClose {
                let item = self
                    .session
                    .item_mut(item_id)
                    .expect("open item located above");
                item.status = ItemStatus::Open;
            }
            self.arm_quiet_clock(item_id);
        }
        self.audit(None, "session_resumed", None).await;
        self.system_message("Session resumed by the auctioneer.".to_string())
            .await;
        let deadline = self.clock.as_ref().map(|clock| clock.wall_deadline);
        self.publish(UpdateEvent::PhaseChange(PhaseChange {
            session_phase: SessionPhase::Live,
            item_id: self.session.current_item_id,
            item_status: self.current_item_status(),
            winner: None,
            deadline,
        }));
        Ok(())
    }

    async fn post_message(
        &mut self,
        sender_id: &str,
        text: String,
    ) -> Result<Message, RestError> {
        let participant = self
            .session
            .participants
            .get(sender_id)
            .ok_or_else(|| {
                RestError::BadParameters("Sender has not joined the room".to_string())
            })?;
        let (kind, sender) = match participant.role {
            ParticipantRole::Auctioneer => (MessageKind::Auctioneer, "AUCTIONEER".to_string()),
            ParticipantRole::Supplier => {
                (MessageKind::Supplier, participant.display_name.clone())
            }
        };
        let message = Message {
            id: Uuid::new_v4(),
            kind,
            sender,
            text,
            timestamp: OffsetDateTime::now_utc(),
        };
        self.repo
            .add_message(&self.session.tender_id, &message)
            .await?;
        self.session.chat.push(message.clone());
        self.publish(UpdateEvent::NewMessage(message.clone()));
        Ok(message)
    }

    async fn handle_deadline(&mut self) {
        let Some(clock) = self.clock.take() else {
            return;
        };
        let item_id = clock.item_id;
        let Some(item) = self.session.item(item_id) else {
            return;
        };
        match item.status {
            ItemStatus::Open => {
                // Quiet period elapsed without bids: sample the closing
                // window once and start it.
                let item = self
                    .session
                    .item_mut(item_id)
                    .expect("item located above");
                item.status = ItemStatus::InRandomClose;
                self.arm_random_clock(item_id);
                self.audit(Some(item_id), "random_window", None).await;
                self.system_message(
                    "Random closing window started: the item may close at any moment. \
                     Send a bid to return to open dispute."
                        .to_string(),
                )
                .await;
                let deadline = self.clock.as_ref().map(|clock| clock.wall_deadline);
                self.publish(UpdateEvent::PhaseChange(PhaseChange {
                    session_phase: self.session.phase,
                    item_id: Some(item_id),
                    item_status: Some(ItemStatus::InRandomClose),
                    winner: None,
                    deadline,
                }));
            }
            ItemStatus::InRandomClose => {
                self.close_item_now(item_id, "closed automatically after the random window")
                    .await;
            }
            _ => {}
        }
    }

    async fn close_item_now(&mut self, item_id: ItemId, cause: &str) {
        self.clock = None;
        let Some(item) = self.session.item(item_id) else {
            return;
        };
        let number = item.number;
        let winner = best_active(item).cloned();

        let item = self
            .session
            .item_mut(item_id)
            .expect("item located above");
        item.status = ItemStatus::Closed;
        item.winning_bid_id = winner.as_ref().map(|bid| bid.id);
        if self.session.current_item_id == Some(item_id) {
            self.session.current_item_id = None;
        }

        if let Some(winner) = &winner {
            if let Err(err) = self.repo.set_item_winner(item_id, winner.id).await {
                tracing::error!(
                    tender_id = %self.session.tender_id,
                    %item_id,
                    error = %err,
                    "Failed to record item winner"
                );
            }
        }
        self.audit(Some(item_id), "item_closed", Some(cause)).await;
        match &winner {
            Some(winner) => {
                self.system_message(format!(
                    "Item {number} closed. Best offer: {} by {}.",
                    winner.value, winner.display_name
                ))
                .await
            }
            None => {
                self.system_message(format!("Item {number} closed with no valid offers."))
                    .await
            }
        }

        if self.session.all_items_closed() {
            self.session.phase = SessionPhase::Closed;
            self.audit(None, "session_closed", None).await;
            self.system_message("All items closed. The dispute session has ended.".to_string())
                .await;
        }
        self.publish(UpdateEvent::PhaseChange(PhaseChange {
            session_phase: self.session.phase,
            item_id: Some(item_id),
            item_status: Some(ItemStatus::Closed),
            winner,
            deadline: None,
        }));
    }

    fn arm_quiet_clock(&mut self, item_id: ItemId) {
        self.arm_clock(item_id, self.config.quiet_period);
    }

    // Sampled once when the window starts; never re-sampled while it runs.
    // The window is at least one second so it always exists.
    fn arm_random_clock(&mut self, item_id: ItemId) {
        let max = self.config.random_window_max.as_secs().max(1);
        let sampled = Duration::from_secs(rand::thread_rng().gen_range(1..=max));
        self.arm_clock(item_id, sampled);
    }

    fn arm_clock(&mut self, item_id: ItemId, after: Duration) {
        self.clock = Some(ClosingClock {
            item_id,
            deadline: Instant::now() + after,
            wall_deadline: OffsetDateTime::now_utc() + after,
        });
    }

    fn ensure_auctioneer(&self, caller_id: &str) -> Result<(), RestError> {
        match self.session.participants.get(caller_id) {
            Some(participant) if participant.role == ParticipantRole::Auctioneer => Ok(()),
            _ => Err(RestError::Unauthorized),
        }
    }

    fn current_item_status(&self) -> Option<ItemStatus> {
        self.session
            .current_item_id
            .and_then(|item_id| self.session.item(item_id))
            .map(|item| item.status)
    }

    fn snapshot(&self) -> SessionSnapshot {
        let mut participants: Vec<Participant> =
            self.session.participants.values().cloned().collect();
        participants.sort_by(|a, b| a.id.cmp(&b.id));
        SessionSnapshot {
            tender_id:       self.session.tender_id.clone(),
            phase:           self.session.phase,
            mode:            self.session.mode,
            current_item_id: self.session.current_item_id,
            items:           self.session.items.iter().map(|item| item.to_api()).collect(),
            participants,
            messages:        self.session.chat.clone(),
            clock:           self.clock.as_ref().and_then(|clock| {
                self.session.item(clock.item_id).map(|item| ClockStatus {
                    item_id:  clock.item_id,
                    status:   item.status,
                    deadline: clock.wall_deadline,
                })
            }),
        }
    }

    async fn system_message(&mut self, text: String) {
        let message = Message {
            id: Uuid::new_v4(),
            kind: MessageKind::System,
            sender: "SYSTEM".to_string(),
            text,
            timestamp: OffsetDateTime::now_utc(),
        };
        if let Err(err) = self
            .repo
            .add_message(&self.session.tender_id, &message)
            .await
        {
            tracing::warn!(
                tender_id = %self.session.tender_id,
                error = ?err,
                "Failed to persist system message"
            );
        }
        self.session.chat.push(message.clone());
        self.publish(UpdateEvent::NewMessage(message));
    }

    async fn audit(&self, item_id: Option<ItemId>, phase: &str, detail: Option<&str>) {
        if let Err(err) = self
            .repo
            .add_phase_transition(&self.session.tender_id, item_id, phase, detail)
            .await
        {
            tracing::error!(
                tender_id = %self.session.tender_id,
                phase,
                error = %err,
                "Failed to persist phase transition"
            );
        }
    }

    fn publish(&self, event: UpdateEvent) {
        // Fire-and-forget: an error only means nobody is subscribed.
        let _ = self.events.send(event);
    }

    fn check_invariants(&self) -> anyhow::Result<()> {
        let disputed = self
            .session
            .items
            .iter()
            .filter(|item| item.accepts_bids())
            .count();
        if disputed > 1 {
            anyhow::bail!("{disputed} items are accepting bids at once");
        }
        if let Some(clock) = &self.clock {
            let item = self
                .session
                .item(clock.item_id)
                .ok_or_else(|| anyhow::anyhow!("closing clock references an unknown item"))?;
            if !item.accepts_bids() {
                anyhow::bail!("closing clock armed on an item that is not under dispute");
            }
        }
        for item in &self.session.items {
            if item.status == ItemStatus::Closed {
                let expected = best_active(item).map(|bid| bid.id);
                if item.winning_bid_id != expected {
                    anyhow::bail!("recorded winner of item {} diverges from the log", item.number);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::super::tests::{
            item_id,
            join,
            open_item_one,
            submit,
            test_service,
        },
        crate::{
            api::ws::UpdateEvent,
            session::service::get_snapshot::GetSnapshotInput,
        },
        dispute_api_types::session::{
            ItemStatus,
            ParticipantRole,
            SessionPhase,
        },
        rust_decimal::Decimal,
        std::time::Duration,
        tokio::sync::broadcast,
    };

    /// Reads deltas (auto-advancing the paused clock while the worker's
    /// timers are the only pending work) until one matches.
    async fn next_matching<T>(
        events: &mut broadcast::Receiver<UpdateEvent>,
        mut pick: impl FnMut(UpdateEvent) -> Option<T>,
    ) -> T {
        loop {
            let event = events.recv().await.expect("delta stream must stay open");
            if let Some(found) = pick(event) {
                return found;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_period_expiry_starts_the_random_window_once() {
        let service = test_service();
        let mut auctioneer = open_item_one(&service).await;
        join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;
        submit(&service, "supplier-1", 100).await.expect("accepted");

        let update = next_matching(&mut auctioneer.events, |event| match event {
            UpdateEvent::PhaseChange(update)
                if update.item_status == Some(ItemStatus::InRandomClose) =>
            {
                Some(update)
            }
            _ => None,
        })
        .await;
        assert_eq!(update.item_id, Some(item_id(1)));
        assert!(update.deadline.is_some());

        // No further bids: the sampled window elapses and the item closes
        // with the best active bid as winner.
        let closed = next_matching(&mut auctioneer.events, |event| match event {
            UpdateEvent::PhaseChange(update)
                if update.item_status == Some(ItemStatus::Closed) =>
            {
                Some(update)
            }
            _ => None,
        })
        .await;
        let winner = closed.winner.expect("winner announced on close");
        assert_eq!(winner.value, Decimal::from(100));
        // Item 2 is still pending, so the session stays live.
        assert_eq!(closed.session_phase, SessionPhase::Live);
    }

    #[tokio::test(start_paused = true)]
    async fn bid_during_the_random_window_reopens_the_dispute() {
        let service = test_service();
        let mut auctioneer = open_item_one(&service).await;
        join(&service, "supplier-1", "Alfa", ParticipantRole::Supplier).await;
        join(&service, "supplier-2", "Beta", ParticipantRole::Supplier).await;
        submit(&service, "supplier-1", 100).await.expect("accepted");

        next_matching(&mut auctioneer.events, |event| match event {
            UpdateEvent::PhaseChange(update)
                if update.item_status == Some(ItemStatus::InRandomClose) =>
            {
                Some(())
            }
            _ => None,
        })
        .await;

        // A late bid interrupts the window and restarts ordinary disputing.
        submit(&service, "supplier-2", 90).await.expect("accepted during the window");
        let reopened = next_matching(&mut auctioneer.events, |event| match event {
            UpdateEvent::PhaseChange(update)
                if update.item_status == Some(ItemStatus::Open) =>
            {
                Some(update)
            }
            _ => None,
        })
        .await;
        assert!(reopened.deadline.is_some());

        // Left alone again, the item eventually closes on the new best.
        let closed = next_matching(&mut auctioneer.events, |event| match event {
            UpdateEvent::PhaseChange(update)
                if update.item_status == Some(ItemStatus::Closed) =>
            {
                Some(update)
            }
            _ => None,
        })
        .await;
        assert_eq!(
            closed.winner.expect("winner announced").value,
            Decimal::from(90)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn suspension_freezes_the_clock_until_resume() {
        let service = test_service();
        open_item_one(&service).await;
        service
            .suspend_session(crate::session::service::suspend_session::SuspendSessionInput {
                tender_id: super::super::tests::TENDER.to_string(),
                caller_id: "auctioneer-1".to_string(),
                reason:    "verifying supplier documents".to_string(),
            })
            .await
            .expect("suspend");

        // Two hours pass: far beyond quiet period plus the largest possible
        // random window. Nothing may close while suspended.
        tokio::time::sleep(Duration::from_secs(7200)).await;
        let snapshot = service
            .get_snapshot(GetSnapshotInput {
                tender_id: super::super::tests::TENDER.to_string(),
            })
            .await
            .expect("snapshot");
        assert_eq!(snapshot.phase, SessionPhase::Suspended);
        assert_eq!(snapshot.items[0].status, ItemStatus::Open);
        assert!(snapshot.clock.is_none());

        service
            .resume_session(crate::session::service::resume_session::ResumeSessionInput {
                tender_id: super::super::tests::TENDER.to_string(),
                caller_id: "auctioneer-1".to_string(),
            })
            .await
            .expect("resume");
        tokio::time::sleep(Duration::from_secs(7200)).await;
        let snapshot = service
            .get_snapshot(GetSnapshotInput {
                tender_id: super::super::tests::TENDER.to_string(),
            })
            .await
            .expect("snapshot");
        // No bids were ever placed: the item closed without a winner.
        assert_eq!(snapshot.items[0].status, ItemStatus::Closed);
        assert_eq!(snapshot.items[0].winning_bid_id, None);
        assert_eq!(snapshot.phase, SessionPhase::Live);
    }
}
