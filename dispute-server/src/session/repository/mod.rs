mod add_bid;
mod add_message;
mod add_phase_transition;
mod cancel_bid;
mod get_bids;
mod get_tender;
pub mod models;
mod set_item_winner;

pub use {
    self::get_tender::TenderDispute,
    self::models::*,
};

/// Durable record of everything the engine must be able to replay: accepted
/// bids, cancellations, phase transitions, chat, and the winner hand-off.
/// Writes happen before the matching broadcast.
#[derive(Debug)]
pub struct Repository {
    db: Box<dyn Database>,
}

impl Repository {
    pub fn new(db: impl Database) -> Self {
        Self { db: Box::new(db) }
    }
}
