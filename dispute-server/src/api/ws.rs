use {
    super::RestError,
    crate::{
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        session::service::{
            cancel_bid::CancelBidInput,
            close_item::CloseItemInput,
            join_session::JoinSessionInput,
            leave_session::LeaveSessionInput,
            post_message::PostMessageInput,
            resume_session::ResumeSessionInput,
            select_item::SelectItemInput,
            submit_bid::SubmitBidInput,
            suspend_session::SuspendSessionInput,
        },
        state::Store,
    },
    anyhow::{
        anyhow,
        Result,
    },
    axum::{
        extract::{
            ws::{
                Message as WsMessage,
                WebSocket,
            },
            State,
            WebSocketUpgrade,
        },
        http::HeaderMap,
        response::IntoResponse,
    },
    dispute_api_types::{
        bid::{
            Bid,
            BidCancel,
            BidCreate,
        },
        session::{
            ChatPost,
            ItemSelect,
            Message,
            Participant,
            PhaseChange,
            RoomJoin,
            SessionResume,
            SessionSuspend,
        },
        ws::{
            APIResponse,
            ClientMessage,
            ClientRequest,
            ServerResultMessage,
            ServerResultResponse,
            ServerUpdateResponse,
        },
        ParticipantId,
        TenderId,
    },
    futures::{
        future::Either,
        stream::{
            SplitSink,
            SplitStream,
        },
        SinkExt,
        StreamExt,
    },
    std::{
        collections::{
            HashMap,
            HashSet,
        },
        net::IpAddr,
        sync::{
            atomic::{
                AtomicUsize,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    tokio::sync::{
        broadcast,
        RwLock,
    },
};

pub struct WsState {
    pub requester_ip_header_name: String,
    subscriber_counter:           AtomicUsize,
    subscriber_per_ip:            RwLock<HashMap<IpAddr, HashSet<SubscriberId>>>,
}

const MAXIMUM_SUBSCRIBERS_PER_IP: usize = 10;

impl WsState {
    pub fn new(requester_ip_header_name: String) -> Self {
        Self {
            requester_ip_header_name,
            subscriber_counter: AtomicUsize::new(0),
            subscriber_per_ip: RwLock::new(HashMap::new()),
        }
    }

    /// If the specified IP address has too many open websocket connections,
    /// this function will return none. Otherwise, it will return the new
    /// subscriber id.
    pub async fn get_new_subscriber_id(&self, ip: Option<IpAddr>) -> Option<SubscriberId> {
        let id = self.subscriber_counter.fetch_add(1, Ordering::SeqCst);
        if let Some(ip) = ip {
            let mut write_guard = self.subscriber_per_ip.write().await;
            let ids = write_guard.entry(ip).or_insert_with(HashSet::new);
            if ids.len() >= MAXIMUM_SUBSCRIBERS_PER_IP {
                return None;
            }
            ids.insert(id);
        }
        Some(id)
    }

    pub async fn remove_subscriber(&self, id: SubscriberId, ip: Option<IpAddr>) {
        if let Some(ip) = ip {
            let mut write_guard = self.subscriber_per_ip.write().await;
            if let Some(ids) = write_guard.get_mut(&ip) {
                ids.remove(&id);
                if ids.is_empty() {
                    write_guard.remove(&ip);
                }
            }
        }
    }
}

/// State delta fanned out to every subscriber of one room.
#[derive(Clone, Debug)]
pub enum UpdateEvent {
    NewBid(Bid),
    BidCancelled(Bid),
    NewMessage(Message),
    PresenceUpdate(Participant),
    PhaseChange(PhaseChange),
}

pub type SubscriberId = usize;

pub async fn ws_route_handler(
    ws: WebSocketUpgrade,
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let ws_state = &store.ws;
    let requester_ip = headers
        .get(ws_state.requester_ip_header_name.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next()) // Only take the first ip if there are multiple
        .and_then(|value| value.parse().ok());

    if requester_ip.is_none() {
        tracing::warn!("Failed to get requester IP address");
    }

    match ws_state.get_new_subscriber_id(requester_ip).await {
        Some(subscriber_id) => ws.on_upgrade(move |socket| {
            websocket_handler(socket, store, subscriber_id, requester_ip)
        }),
        None => RestError::TooManyOpenWebsocketConnections.into_response(),
    }
}

async fn websocket_handler(
    stream: WebSocket,
    store: Arc<Store>,
    subscriber_id: SubscriberId,
    requester_ip: Option<IpAddr>,
) {
    let (sender, receiver) = stream.split();
    let mut subscriber = Subscriber::new(subscriber_id, store.clone(), receiver, sender);
    subscriber.run().await;
    store.ws.remove_subscriber(subscriber_id, requester_ip).await;
}

/// The room this connection entered: who joined, and the delta subscription
/// taken atomically with the snapshot that answered the join.
struct RoomSubscription {
    tender_id:      TenderId,
    participant_id: ParticipantId,
    events:         broadcast::Receiver<UpdateEvent>,
}

/// Subscriber is an actor that handles a single websocket connection.
/// It relays the joined room's deltas to the client and turns client
/// requests into session service calls.
pub struct Subscriber {
    id:                  SubscriberId,
    closed:              bool,
    store:               Arc<Store>,
    receiver:            SplitStream<WebSocket>,
    sender:              SplitSink<WebSocket, WsMessage>,
    room:                Option<RoomSubscription>,
    ping_interval:       tokio::time::Interval,
    exit_check_interval: tokio::time::Interval,
    responded_to_ping:   bool,
}

const PING_INTERVAL_DURATION: Duration = Duration::from_secs(30);

impl Subscriber {
    pub fn new(
        id: SubscriberId,
        store: Arc<Store>,
        receiver: SplitStream<WebSocket>,
        sender: SplitSink<WebSocket, WsMessage>,
    ) -> Self {
        Self {
            id,
            closed: false,
            store,
            receiver,
            sender,
            room: None,
            ping_interval: tokio::time::interval(PING_INTERVAL_DURATION),
            exit_check_interval: tokio::time::interval(EXIT_CHECK_INTERVAL),
            responded_to_ping: true, // We start with true so we don't close the connection immediately
        }
    }

    pub async fn run(&mut self) {
        while !self.closed {
            if let Err(e) = self.handle_next().await {
                tracing::debug!(subscriber = self.id, error = ?e, "Error handling subscriber message");
                break;
            }
        }
        // A dropped transport is not an application error: the participant
        // goes offline and resynchronizes via a fresh snapshot on reconnect.
        if let Some(room) = self.room.take() {
            self.store
                .sessions
                .leave_session(LeaveSessionInput {
                    tender_id:      room.tender_id,
                    participant_id: room.participant_id,
                })
                .await;
        }
    }

    async fn handle_next(&mut self) -> Result<()> {
        let room_update = match self.room.as_mut() {
            Some(room) => Either::Left(room.events.recv()),
            None => Either::Right(futures::future::pending()),
        };
        tokio::select! {
            maybe_update = room_update => {
                match maybe_update {
                    Ok(event) => self.handle_update(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => Err(anyhow!(
                        "Subscriber lagged {skipped} deltas behind the room; closing for resync"
                    )),
                    Err(broadcast::error::RecvError::Closed) => {
                        Err(anyhow!("The room was torn down"))
                    }
                }
            },
            maybe_message_or_err = self.receiver.next() => {
                self.handle_client_message(
                    maybe_message_or_err.ok_or(anyhow!("Client channel is closed"))??
                ).await
            },
            _ = self.ping_interval.tick() => {
                if !self.responded_to_ping {
                    return Err(anyhow!("Subscriber did not respond to ping. Closing connection."));
                }
                self.responded_to_ping = false;
                self.sender.send(WsMessage::Ping(vec![])).await?;
                Ok(())
            },
            _ = self.exit_check_interval.tick() => {
                if SHOULD_EXIT.load(Ordering::Acquire) {
                    self.sender.close().await?;
                    self.closed = true;
                    return Err(anyhow!("Application is shutting down. Closing connection."));
                }
                Ok(())
            }
        }
    }

    async fn handle_update(&mut self, event: UpdateEvent) -> Result<()> {
        let update = match event {
            UpdateEvent::NewBid(bid) => ServerUpdateResponse::NewBid { bid },
            UpdateEvent::BidCancelled(bid) => ServerUpdateResponse::BidCancelled { bid },
            UpdateEvent::NewMessage(message) => ServerUpdateResponse::NewMessage { message },
            UpdateEvent::PresenceUpdate(participant) => {
                ServerUpdateResponse::PresenceUpdate { participant }
            }
            UpdateEvent::PhaseChange(update) => ServerUpdateResponse::PhaseChange { update },
        };
        self.sender
            .send(serde_json::to_string(&update)?.into())
            .await?;
        Ok(())
    }

    async fn send_result(&mut self, response: ServerResultResponse) -> Result<()> {
        self.sender
            .send(serde_json::to_string(&response)?.into())
            .await?;
        Ok(())
    }

    /// The room this connection joined; every operation after `join_room`
    /// acts on behalf of that participant, so a connection cannot speak for
    /// anyone it did not join as.
    fn joined_room(&self) -> Result<(&TenderId, &ParticipantId), RestError> {
        self.room
            .as_ref()
            .map(|room| (&room.tender_id, &room.participant_id))
            .ok_or_else(|| RestError::BadParameters("Join a room first".to_string()))
    }

    fn ensure_joined_tender(&self, tender_id: &TenderId) -> Result<ParticipantId, RestError> {
        let (joined_tender, participant_id) = self.joined_room()?;
        if joined_tender != tender_id {
            return Err(RestError::BadParameters(
                "The request does not refer to the joined room".to_string(),
            ));
        }
        Ok(participant_id.clone())
    }

    async fn handle_join_room(&mut self, join: RoomJoin) -> Result<Option<APIResponse>, RestError> {
        if self.room.is_some() {
            return Err(RestError::Conflict(
                "This connection has already joined a room".to_string(),
            ));
        }
        let outcome = self
            .store
            .sessions
            .join_session(JoinSessionInput {
                tender_id:      join.tender_id.clone(),
                participant_id: join.participant_id.clone(),
                display_name:   join.display_name,
                role:           join.role,
            })
            .await?;
        self.room = Some(RoomSubscription {
            tender_id:      join.tender_id,
            participant_id: join.participant_id,
            events:         outcome.events,
        });
        Ok(Some(APIResponse::Snapshot(outcome.snapshot)))
    }

    async fn handle_submit_bid(&mut self, bid: BidCreate) -> Result<Option<APIResponse>, RestError> {
        let participant_id = self.ensure_joined_tender(&bid.tender_id)?;
        if bid.supplier_id != participant_id {
            return Err(RestError::Unauthorized);
        }
        let accepted = self
            .store
            .sessions
            .submit_bid(SubmitBidInput {
                tender_id:   bid.tender_id,
                supplier_id: bid.supplier_id,
                item_id:     bid.item_id,
                value:       bid.value,
            })
            .await?;
        Ok(Some(APIResponse::Bid(accepted)))
    }

    async fn handle_cancel_bid(&mut self, data: BidCancel) -> Result<Option<APIResponse>, RestError> {
        let caller_id = self.ensure_joined_tender(&data.tender_id)?;
        self.store
            .sessions
            .cancel_bid(CancelBidInput {
                tender_id: data.tender_id,
                caller_id,
                bid_id: data.bid_id,
                reason: data.reason,
            })
            .await?;
        Ok(None)
    }

    async fn handle_select_item(&mut self, data: ItemSelect) -> Result<Option<APIResponse>, RestError> {
        let caller_id = self.ensure_joined_tender(&data.tender_id)?;
        self.store
            .sessions
            .select_item(SelectItemInput {
                tender_id: data.tender_id,
                caller_id,
                item_id: data.item_id,
            })
            .await?;
        Ok(None)
    }

    async fn handle_close_item(&mut self, data: ItemSelect) -> Result<Option<APIResponse>, RestError> {
        let caller_id = self.ensure_joined_tender(&data.tender_id)?;
        self.store
            .sessions
            .close_item(CloseItemInput {
                tender_id: data.tender_id,
                caller_id,
                item_id: data.item_id,
            })
            .await?;
        Ok(None)
    }

    async fn handle_suspend_session(
        &mut self,
        data: SessionSuspend,
    ) -> Result<Option<APIResponse>, RestError> {
        let caller_id = self.ensure_joined_tender(&data.tender_id)?;
        self.store
            .sessions
            .suspend_session(SuspendSessionInput {
                tender_id: data.tender_id,
                caller_id,
                reason: data.reason,
            })
            .await?;
        Ok(None)
    }

    async fn handle_resume_session(
        &mut self,
        data: SessionResume,
    ) -> Result<Option<APIResponse>, RestError> {
        let caller_id = self.ensure_joined_tender(&data.tender_id)?;
        self.store
            .sessions
            .resume_session(ResumeSessionInput {
                tender_id: data.tender_id,
                caller_id,
            })
            .await?;
        Ok(None)
    }

    async fn handle_chat_message(&mut self, data: ChatPost) -> Result<Option<APIResponse>, RestError> {
        let sender_id = self.ensure_joined_tender(&data.tender_id)?;
        self.store
            .sessions
            .post_message(PostMessageInput {
                tender_id: data.tender_id,
                sender_id,
                text: data.text,
            })
            .await?;
        Ok(None)
    }

    async fn handle_client_message(&mut self, message: WsMessage) -> Result<()> {
        let maybe_client_message = match message {
            WsMessage::Close(_) => {
                // Send the close message to gracefully shut down the
                // connection; otherwise the client might get an abnormal
                // websocket closure error.
                if let Err(e) = self.sender.close().await {
                    return Err(e.into());
                }
                self.closed = true;
                return Ok(());
            }
            WsMessage::Text(text) => serde_json::from_str::<ClientRequest>(&text),
            WsMessage::Binary(data) => serde_json::from_slice::<ClientRequest>(&data),
            WsMessage::Ping(_) => {
                // Axum will send Pong automatically
                return Ok(());
            }
            WsMessage::Pong(_) => {
                self.responded_to_ping = true;
                return Ok(());
            }
        };

        let ClientRequest { id, msg } = match maybe_client_message {
            Err(e) => {
                return self
                    .send_result(ServerResultResponse {
                        id:     None,
                        result: ServerResultMessage::Err(e.to_string()),
                    })
                    .await;
            }
            Ok(request) => request,
        };

        let response = match msg {
            ClientMessage::JoinRoom { join } => self.handle_join_room(join).await,
            ClientMessage::SubmitBid { bid } => self.handle_submit_bid(bid).await,
            ClientMessage::CancelBid { data } => self.handle_cancel_bid(data).await,
            ClientMessage::SelectItem { data } => self.handle_select_item(data).await,
            ClientMessage::CloseItem { data } => self.handle_close_item(data).await,
            ClientMessage::SuspendSession { data } => self.handle_suspend_session(data).await,
            ClientMessage::ResumeSession { data } => self.handle_resume_session(data).await,
            ClientMessage::ChatMessage { data } => self.handle_chat_message(data).await,
        };
        let result = match response {
            Ok(payload) => ServerResultMessage::Success(payload),
            Err(e) => ServerResultMessage::Err(e.to_status_and_message().1),
        };
        self.send_result(ServerResultResponse {
            id: Some(id),
            result,
        })
        .await
    }
}
