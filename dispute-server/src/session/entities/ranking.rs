use {
    super::Item,
    dispute_api_types::bid::{
        Bid,
        BidStatus,
    },
};

/// The current best offer of an item: the active bid with the lowest value,
/// ties broken by earliest arrival. Cancelled bids never count.
pub fn best_active(item: &Item) -> Option<&Bid> {
    item.bids
        .iter()
        .filter(|bid| bid.status == BidStatus::Active)
        .min_by(|a, b| (a.value, a.sequence).cmp(&(b.value, b.sequence)))
}

/// Active bids of an item in ranking order, with 1-based positions.
/// Recomputed from scratch on every call.
pub fn rank(item: &Item) -> Vec<(u32, &Bid)> {
    let mut active: Vec<&Bid> = item
        .bids
        .iter()
        .filter(|bid| bid.status == BidStatus::Active)
        .collect();
    active.sort_by(|a, b| (a.value, a.sequence).cmp(&(b.value, b.sequence)));
    active
        .into_iter()
        .enumerate()
        .map(|(index, bid)| (index as u32 + 1, bid))
        .collect()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rand::Rng,
        rust_decimal::Decimal,
        time::OffsetDateTime,
        uuid::Uuid,
    };

    fn item_with_bids(bids: Vec<Bid>) -> Item {
        let mut item = Item::new(
            Uuid::new_v4(),
            1,
            "Desktop computer".to_string(),
            Decimal::from(50),
            "UN".to_string(),
            Decimal::from(4500),
        );
        for bid in bids {
            item.restore_bid(bid);
        }
        item
    }

    fn bid(value: i64, sequence: u64, status: BidStatus) -> Bid {
        Bid {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            supplier_id: format!("supplier-{sequence}"),
            display_name: "sup***".to_string(),
            value: Decimal::from(value),
            sequence,
            submitted_at: OffsetDateTime::UNIX_EPOCH,
            status,
            cancel_reason: None,
        }
    }

    #[test]
    fn best_active_ignores_cancelled_bids() {
        let item = item_with_bids(vec![
            bid(100, 1, BidStatus::Active),
            bid(80, 2, BidStatus::Cancelled),
            bid(90, 3, BidStatus::Active),
        ]);
        assert_eq!(best_active(&item).unwrap().value, Decimal::from(90));
    }

    #[test]
    fn ties_break_by_earliest_sequence() {
        let item = item_with_bids(vec![
            bid(90, 1, BidStatus::Active),
            bid(90, 2, BidStatus::Active),
        ]);
        assert_eq!(best_active(&item).unwrap().sequence, 1);
    }

    #[test]
    fn rank_orders_by_value_then_sequence() {
        let item = item_with_bids(vec![
            bid(100, 1, BidStatus::Active),
            bid(90, 2, BidStatus::Active),
            bid(90, 3, BidStatus::Active),
            bid(95, 4, BidStatus::Cancelled),
        ]);
        let positions: Vec<(u32, u64)> = rank(&item)
            .into_iter()
            .map(|(position, bid)| (position, bid.sequence))
            .collect();
        assert_eq!(positions, vec![(1, 2), (2, 3), (3, 1)]);
    }

    #[test]
    fn empty_item_has_no_best() {
        let item = item_with_bids(vec![]);
        assert!(best_active(&item).is_none());
    }

    // Exhaustive-over-randomness check: whatever the arrival order and the
    // cancellation pattern, the best active bid is the minimum active value.
    #[test]
    fn best_active_is_minimum_over_random_sequences() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let count = rng.gen_range(1..30);
            let bids: Vec<Bid> = (1..=count)
                .map(|sequence| {
                    let status = if rng.gen_bool(0.2) {
                        BidStatus::Cancelled
                    } else {
                        BidStatus::Active
                    };
                    bid(rng.gen_range(1..1000), sequence, status)
                })
                .collect();
            let item = item_with_bids(bids.clone());
            let expected = bids
                .iter()
                .filter(|b| b.status == BidStatus::Active)
                .map(|b| b.value)
                .min();
            assert_eq!(best_active(&item).map(|b| b.value), expected);
        }
    }
}
