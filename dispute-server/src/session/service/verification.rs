use {
    crate::api::RestError,
    dispute_api_types::{
        bid::Bid,
        session::{
            ItemStatus,
            SessionPhase,
        },
    },
    rust_decimal::Decimal,
};

pub fn ensure_positive_value(value: Decimal) -> Result<(), RestError> {
    if value <= Decimal::ZERO {
        return Err(RestError::BadParameters(
            "Bid value must be strictly positive".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_reason(reason: &str) -> Result<(), RestError> {
    if reason.trim().is_empty() {
        return Err(RestError::BadParameters(
            "A non-empty reason is required".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_session_live(phase: SessionPhase) -> Result<(), RestError> {
    if phase != SessionPhase::Live {
        return Err(RestError::InvalidPhase(format!(
            "Session is not live (current phase: {phase:?})"
        )));
    }
    Ok(())
}

pub fn ensure_item_open(status: ItemStatus) -> Result<(), RestError> {
    if !matches!(status, ItemStatus::Open | ItemStatus::InRandomClose) {
        return Err(RestError::InvalidPhase(format!(
            "Item is not accepting bids (current status: {status:?})"
        )));
    }
    Ok(())
}

/// Open-mode improvement rule: a bid is only acceptable if it is strictly
/// lower than the best active offer at the moment of acceptance. The first
/// offer on an item is always acceptable.
pub fn ensure_improvement(best: Option<&Bid>, value: Decimal) -> Result<(), RestError> {
    if let Some(best) = best {
        if value >= best.value {
            return Err(RestError::NotAnImprovement(format!(
                "Bid must be lower than the current best offer of {}",
                best.value
            )));
        }
    }
    Ok(())
}
