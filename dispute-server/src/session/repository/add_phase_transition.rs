use {
    super::{
        models,
        Repository,
    },
    crate::kernel::entities::{
        ItemId,
        TenderId,
    },
    time::OffsetDateTime,
    uuid::Uuid,
};

impl Repository {
    /// Audit-trail append. A failure here is logged by the caller but does
    /// not abort the transition: the bid log stays authoritative.
    pub async fn add_phase_transition(
        &self,
        tender_id: &TenderId,
        item_id: Option<ItemId>,
        phase: &str,
        detail: Option<&str>,
    ) -> anyhow::Result<()> {
        let row = models::PhaseTransition {
            id: Uuid::new_v4(),
            tender_id: tender_id.clone(),
            item_id,
            phase: phase.to_string(),
            detail: detail.map(str::to_string),
            occurred_at: OffsetDateTime::now_utc(),
        };
        self.db.add_phase_transition(&row).await
    }
}
