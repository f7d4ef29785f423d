use {
    super::{
        verification,
        worker::SessionCommand,
        Service,
    },
    crate::{
        api::RestError,
        kernel::entities::{
            BidId,
            ParticipantId,
            TenderId,
        },
    },
    dispute_api_types::bid::Bid,
};

#[derive(Debug, Clone)]
pub struct CancelBidInput {
    pub tender_id: TenderId,
    pub caller_id: ParticipantId,
    pub bid_id:    BidId,
    pub reason:    String,
}

impl Service {
    /// Administrative cancellation of a bid. Auctioneer-only; the bid stays
    /// in the history marked cancelled and the ranking is recomputed without
    /// it. The justification is announced in the room.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(
        tender_id = %input.tender_id,
        bid_id = %input.bid_id,
    ))]
    pub async fn cancel_bid(&self, input: CancelBidInput) -> Result<Bid, RestError> {
        verification::ensure_reason(&input.reason)?;
        let commands = self.get(&input.tender_id)?;
        self.request(commands, &input.tender_id, |respond_to| {
            SessionCommand::CancelBid {
                caller_id: input.caller_id.clone(),
                bid_id: input.bid_id,
                reason: input.reason.clone(),
                respond_to,
            }
        })
        .await?
    }
}
