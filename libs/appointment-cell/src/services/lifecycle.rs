use tracing::{debug, warn};

use shared_models::records::AppointmentStatus;

use crate::models::SchedulingError;

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed. A reschedule is the
    /// `Scheduled -> Scheduled` transition.
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        debug!(
            "Validating status transition from {} to {}",
            current_status, new_status
        );

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(new_status) {
            warn!(
                "Invalid status transition attempted: {} -> {}",
                current_status, new_status
            );
            return Err(SchedulingError::InvalidState(*current_status));
        }

        Ok(())
    }

    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Scheduled,
                AppointmentStatus::Cancelled,
                AppointmentStatus::Completed,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Cancelled => vec![],
            AppointmentStatus::Completed => vec![],
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn scheduled_can_move_to_every_state() {
        let lifecycle = AppointmentLifecycleService::new();
        for target in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            lifecycle
                .validate_status_transition(&AppointmentStatus::Scheduled, &target)
                .unwrap();
        }
    }

    #[test]
    fn terminal_states_are_closed() {
        let lifecycle = AppointmentLifecycleService::new();
        for terminal in [AppointmentStatus::Cancelled, AppointmentStatus::Completed] {
            for target in [
                AppointmentStatus::Scheduled,
                AppointmentStatus::Cancelled,
                AppointmentStatus::Completed,
            ] {
                let err = lifecycle
                    .validate_status_transition(&terminal, &target)
                    .unwrap_err();
                assert_matches!(err, SchedulingError::InvalidState(s) if s == terminal);
            }
        }
    }
}
