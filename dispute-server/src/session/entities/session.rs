use {
    crate::kernel::entities::{
        BidId,
        ItemId,
        ParticipantId,
        Sequence,
        TenderId,
    },
    dispute_api_types::{
        bid::Bid,
        session as api,
        session::{
            DisputeMode,
            ItemStatus,
            Message,
            Participant,
            SessionPhase,
        },
    },
    rust_decimal::Decimal,
    std::collections::HashMap,
};

/// One item (lot) of the tender, disputed independently.
///
/// `bids` is the full history in arrival order; cancelled bids stay in the
/// list so the record remains attributable. Once `status` is `Closed` the
/// list is never touched again.
#[derive(Clone, Debug)]
pub struct Item {
    pub id:              ItemId,
    pub number:          i32,
    pub description:     String,
    pub quantity:        Decimal,
    pub unit:            String,
    pub reference_value: Decimal,
    pub status:          ItemStatus,
    pub bids:            Vec<Bid>,
    pub winning_bid_id:  Option<BidId>,
    next_sequence:       Sequence,
}

impl Item {
    pub fn new(
        id: ItemId,
        number: i32,
        description: String,
        quantity: Decimal,
        unit: String,
        reference_value: Decimal,
    ) -> Self {
        Self {
            id,
            number,
            description,
            quantity,
            unit,
            reference_value,
            status: ItemStatus::Pending,
            bids: Vec::new(),
            winning_bid_id: None,
            next_sequence: 1,
        }
    }

    pub fn next_sequence(&mut self) -> Sequence {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Re-attaches a bid recovered from the durable log, keeping the
    /// sequence counter ahead of everything already recorded.
    pub fn restore_bid(&mut self, bid: Bid) {
        self.next_sequence = self.next_sequence.max(bid.sequence + 1);
        self.bids.push(bid);
    }

    pub fn accepts_bids(&self) -> bool {
        matches!(self.status, ItemStatus::Open | ItemStatus::InRandomClose)
    }

    pub fn to_api(&self) -> api::Item {
        api::Item {
            id:              self.id,
            number:          self.number,
            description:     self.description.clone(),
            quantity:        self.quantity,
            unit:            self.unit.clone(),
            reference_value: self.reference_value,
            status:          self.status,
            bids:            self.bids.clone(),
            ranking:         super::ranking::rank(self)
                .into_iter()
                .map(|(_, bid)| bid.id)
                .collect(),
            winning_bid_id:  self.winning_bid_id,
        }
    }
}

/// Authoritative state of one dispute room. Exclusively owned and mutated by
/// the session worker; everything else sees it through snapshots and deltas.
#[derive(Clone, Debug)]
pub struct Session {
    pub tender_id:       TenderId,
    pub phase:           SessionPhase,
    pub mode:            DisputeMode,
    pub current_item_id: Option<ItemId>,
    pub items:           Vec<Item>,
    pub participants:    HashMap<ParticipantId, Participant>,
    pub chat:            Vec<Message>,
}

impl Session {
    pub fn new(tender_id: TenderId, mode: DisputeMode, items: Vec<Item>) -> Self {
        Self {
            tender_id,
            phase: SessionPhase::Awaiting,
            mode,
            current_item_id: None,
            items,
            participants: HashMap::new(),
            chat: Vec::new(),
        }
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    /// The item currently under dispute, if any.
    pub fn open_item(&self) -> Option<&Item> {
        self.items.iter().find(|item| item.accepts_bids())
    }

    pub fn all_items_closed(&self) -> bool {
        self.items
            .iter()
            .all(|item| item.status == ItemStatus::Closed)
    }

    pub fn find_bid(&self, bid_id: BidId) -> Option<(&Item, &Bid)> {
        self.items.iter().find_map(|item| {
            item.bids
                .iter()
                .find(|bid| bid.id == bid_id)
                .map(|bid| (item, bid))
        })
    }

    pub fn find_bid_mut(&mut self, bid_id: BidId) -> Option<(ItemStatus, &mut Bid)> {
        self.items.iter_mut().find_map(|item| {
            let status = item.status;
            item.bids
                .iter_mut()
                .find(|bid| bid.id == bid_id)
                .map(|bid| (status, bid))
        })
    }

    /// Display name a supplier's bids and messages are published under. Falls
    /// back to masking the raw id when the supplier never joined the room.
    pub fn published_name(&self, participant_id: &str) -> String {
        self.participants
            .get(participant_id)
            .map(|participant| participant.display_name.clone())
            .unwrap_or_else(|| mask_display_name(participant_id))
    }
}

/// Masks a supplier identity for display in the room. Registry numbers keep
/// their last four characters; names keep their first three.
pub fn mask_display_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() >= 14 && chars.iter().all(|c| c.is_ascii_digit() || !c.is_alphanumeric()) {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        return format!("***{tail}");
    }
    let head: String = chars.iter().take(3).collect();
    format!("{head}***")
}

#[cfg(test)]
mod tests {
    use super::mask_display_name;

    #[test]
    fn masks_registry_numbers_by_tail() {
        assert_eq!(mask_display_name("12.345.678/0001-90"), "***1-90");
        assert_eq!(mask_display_name("12345678000190"), "***0190");
    }

    #[test]
    fn masks_names_by_head() {
        assert_eq!(mask_display_name("Fornecedora Alfa LTDA"), "For***");
        assert_eq!(mask_display_name("ab"), "ab***");
    }
}
