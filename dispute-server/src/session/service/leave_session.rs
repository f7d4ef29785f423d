use {
    super::{
        worker::SessionCommand,
        Service,
    },
    crate::kernel::entities::{
        ParticipantId,
        TenderId,
    },
};

#[derive(Debug, Clone)]
pub struct LeaveSessionInput {
    pub tender_id:      TenderId,
    pub participant_id: ParticipantId,
}

impl Service {
    /// Marks a participant offline after their transport dropped. The record
    /// is retained so the bid and chat history stays attributable; a later
    /// join resynchronizes through a fresh snapshot.
    #[tracing::instrument(skip_all, fields(tender_id = %input.tender_id, participant_id = %input.participant_id))]
    pub async fn leave_session(&self, input: LeaveSessionInput) {
        let Ok(commands) = self.get(&input.tender_id) else {
            return;
        };
        let _ = commands
            .send(SessionCommand::Disconnect {
                participant_id: input.participant_id,
            })
            .await;
    }
}
