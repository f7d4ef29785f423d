#[cfg(test)]
use mockall::automock;
use {
    crate::{
        api::RestError,
        kernel::db::DB,
    },
    axum::async_trait,
    dispute_api_types::{
        bid as api_bid,
        session as api_session,
    },
    rust_decimal::Decimal,
    serde::{
        Deserialize,
        Serialize,
    },
    sqlx::FromRow,
    std::fmt::Debug,
    time::OffsetDateTime,
    tracing::instrument,
    uuid::Uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "dispute_mode", rename_all = "snake_case")]
pub enum DisputeMode {
    Open,
    OpenClosed,
    Closed,
}

impl From<DisputeMode> for api_session::DisputeMode {
    fn from(mode: DisputeMode) -> Self {
        match mode {
            DisputeMode::Open => api_session::DisputeMode::Open,
            DisputeMode::OpenClosed => api_session::DisputeMode::OpenClosed,
            DisputeMode::Closed => api_session::DisputeMode::Closed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "bid_status", rename_all = "snake_case")]
pub enum BidStatus {
    Active,
    Cancelled,
}

impl From<BidStatus> for api_bid::BidStatus {
    fn from(status: BidStatus) -> Self {
        match status {
            BidStatus::Active => api_bid::BidStatus::Active,
            BidStatus::Cancelled => api_bid::BidStatus::Cancelled,
        }
    }
}

impl From<api_bid::BidStatus> for BidStatus {
    fn from(status: api_bid::BidStatus) -> Self {
        match status {
            api_bid::BidStatus::Active => BidStatus::Active,
            api_bid::BidStatus::Cancelled => BidStatus::Cancelled,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "message_kind", rename_all = "snake_case")]
pub enum MessageKind {
    Auctioneer,
    Supplier,
    System,
}

impl From<api_session::MessageKind> for MessageKind {
    fn from(kind: api_session::MessageKind) -> Self {
        match kind {
            api_session::MessageKind::Auctioneer => MessageKind::Auctioneer,
            api_session::MessageKind::Supplier => MessageKind::Supplier,
            api_session::MessageKind::System => MessageKind::System,
        }
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct Tender {
    pub id:     String,
    pub number: String,
    pub title:  String,
    pub mode:   DisputeMode,
}

#[derive(Clone, FromRow, Debug)]
pub struct TenderItem {
    pub id:              Uuid,
    pub tender_id:       String,
    pub number:          i32,
    pub description:     String,
    pub quantity:        Decimal,
    pub unit:            String,
    pub reference_value: Decimal,
    pub winning_bid_id:  Option<Uuid>,
}

#[derive(Clone, FromRow, Debug)]
pub struct Bid {
    pub id:            Uuid,
    pub tender_id:     String,
    pub item_id:       Uuid,
    pub supplier_id:   String,
    pub display_name:  String,
    pub value:         Decimal,
    pub sequence:      i64,
    pub status:        BidStatus,
    pub cancel_reason: Option<String>,
    pub submitted_at:  OffsetDateTime,
}

#[derive(Clone, FromRow, Debug)]
pub struct ChatMessage {
    pub id:        Uuid,
    pub tender_id: String,
    pub kind:      MessageKind,
    pub sender:    String,
    pub text:      String,
    pub sent_at:   OffsetDateTime,
}

/// One row per session or item state transition, the audit trail of the
/// dispute. `item_id` is null for session-level transitions.
#[derive(Clone, FromRow, Debug)]
pub struct PhaseTransition {
    pub id:          Uuid,
    pub tender_id:   String,
    pub item_id:     Option<Uuid>,
    pub phase:       String,
    pub detail:      Option<String>,
    pub occurred_at: OffsetDateTime,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    async fn get_tender(&self, tender_id: &str) -> Result<Option<Tender>, RestError>;
    async fn get_tender_items(&self, tender_id: &str) -> Result<Vec<TenderItem>, RestError>;
    async fn get_bids(&self, tender_id: &str) -> Result<Vec<Bid>, RestError>;
    async fn add_bid(&self, bid: &Bid) -> Result<(), RestError>;
    async fn cancel_bid(
        &self,
        bid_id: Uuid,
        reason: &str,
        cancelled_at: OffsetDateTime,
    ) -> Result<(), RestError>;
    async fn add_message(&self, message: &ChatMessage) -> Result<(), RestError>;
    async fn add_phase_transition(&self, transition: &PhaseTransition) -> anyhow::Result<()>;
    async fn set_item_winner(&self, item_id: Uuid, bid_id: Uuid) -> anyhow::Result<()>;
}

fn unavailable(err: sqlx::Error, query: &str) -> RestError {
    tracing::error!(error = %err, query, "Database query failed");
    RestError::TemporarilyUnavailable
}

#[async_trait]
impl Database for DB {
    #[instrument(
        target = "metrics",
        name = "db_get_tender",
        fields(category = "db_queries", result = "success", name = "get_tender"),
        skip_all
    )]
    async fn get_tender(&self, tender_id: &str) -> Result<Option<Tender>, RestError> {
        sqlx::query_as::<_, Tender>("SELECT id, number, title, mode FROM tender WHERE id = $1")
            .bind(tender_id)
            .fetch_optional(self)
            .await
            .inspect_err(|_| {
                tracing::Span::current().record("result", "error");
            })
            .map_err(|err| unavailable(err, "get_tender"))
    }

    #[instrument(
        target = "metrics",
        name = "db_get_tender_items",
        fields(category = "db_queries", result = "success", name = "get_tender_items"),
        skip_all
    )]
    async fn get_tender_items(&self, tender_id: &str) -> Result<Vec<TenderItem>, RestError> {
        sqlx::query_as::<_, TenderItem>(
            "SELECT id, tender_id, number, description, quantity, unit, reference_value, \
             winning_bid_id \
             FROM tender_item WHERE tender_id = $1 ORDER BY number",
        )
        .bind(tender_id)
        .fetch_all(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })
        .map_err(|err| unavailable(err, "get_tender_items"))
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bids",
        fields(category = "db_queries", result = "success", name = "get_bids"),
        skip_all
    )]
    async fn get_bids(&self, tender_id: &str) -> Result<Vec<Bid>, RestError> {
        sqlx::query_as::<_, Bid>(
            "SELECT id, tender_id, item_id, supplier_id, display_name, value, sequence, \
             status, cancel_reason, submitted_at \
             FROM bid WHERE tender_id = $1 ORDER BY item_id, sequence",
        )
        .bind(tender_id)
        .fetch_all(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })
        .map_err(|err| unavailable(err, "get_bids"))
    }

    #[instrument(
        target = "metrics",
        name = "db_add_bid",
        fields(category = "db_queries", result = "success", name = "add_bid"),
        skip_all
    )]
    async fn add_bid(&self, bid: &Bid) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO bid (id, tender_id, item_id, supplier_id, display_name, value, \
             sequence, status, cancel_reason, submitted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(bid.id)
        .bind(&bid.tender_id)
        .bind(bid.item_id)
        .bind(&bid.supplier_id)
        .bind(&bid.display_name)
        .bind(bid.value)
        .bind(bid.sequence)
        .bind(bid.status)
        .bind(&bid.cancel_reason)
        .bind(bid.submitted_at)
        .execute(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })
        .map_err(|err| unavailable(err, "add_bid"))?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_cancel_bid",
        fields(category = "db_queries", result = "success", name = "cancel_bid"),
        skip_all
    )]
    async fn cancel_bid(
        &self,
        bid_id: Uuid,
        reason: &str,
        cancelled_at: OffsetDateTime,
    ) -> Result<(), RestError> {
        let result = sqlx::query(
            "UPDATE bid SET status = 'cancelled', cancel_reason = $2, cancelled_at = $3 \
             WHERE id = $1 AND status = 'active'",
        )
        .bind(bid_id)
        .bind(reason)
        .bind(cancelled_at)
        .execute(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })
        .map_err(|err| unavailable(err, "cancel_bid"))?;
        if result.rows_affected() == 0 {
            return Err(RestError::BidNotFound);
        }
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_add_message",
        fields(category = "db_queries", result = "success", name = "add_message"),
        skip_all
    )]
    async fn add_message(&self, message: &ChatMessage) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO chat_message (id, tender_id, kind, sender, text, sent_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(message.id)
        .bind(&message.tender_id)
        .bind(message.kind)
        .bind(&message.sender)
        .bind(&message.text)
        .bind(message.sent_at)
        .execute(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })
        .map_err(|err| unavailable(err, "add_message"))?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_add_phase_transition",
        fields(category = "db_queries", result = "success", name = "add_phase_transition"),
        skip_all
    )]
    async fn add_phase_transition(&self, transition: &PhaseTransition) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO phase_transition (id, tender_id, item_id, phase, detail, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(transition.id)
        .bind(&transition.tender_id)
        .bind(transition.item_id)
        .bind(&transition.phase)
        .bind(&transition.detail)
        .bind(transition.occurred_at)
        .execute(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_set_item_winner",
        fields(category = "db_queries", result = "success", name = "set_item_winner"),
        skip_all
    )]
    async fn set_item_winner(&self, item_id: Uuid, bid_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE tender_item SET winning_bid_id = $2 WHERE id = $1")
            .bind(item_id)
            .bind(bid_id)
            .execute(self)
            .await
            .inspect_err(|_| {
                tracing::Span::current().record("result", "error");
            })?;
        Ok(())
    }
}
