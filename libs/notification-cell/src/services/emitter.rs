use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::store::AppointmentStore;
use shared_models::records::{NewNotification, NotificationKind};

/// Records notification events for the scheduling engine.
///
/// Emission is fire-and-forget: a failure to record a notification is logged
/// and swallowed, never surfaced to the booking that triggered it.
pub struct NotificationEmitter {
    store: Arc<dyn AppointmentStore>,
}

impl NotificationEmitter {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub async fn emit(&self, recipient_user_id: Uuid, appointment_id: Uuid, kind: NotificationKind) {
        let record = NewNotification {
            recipient_user_id,
            appointment_id,
            kind,
        };

        match self.store.create_notification(record).await {
            Ok(notification) => {
                debug!(
                    "emitted {} notification {} for user {}",
                    kind, notification.id, recipient_user_id
                );
            }
            Err(e) => {
                warn!(
                    "failed to emit {} notification for user {} on appointment {}: {}",
                    kind, recipient_user_id, appointment_id, e
                );
            }
        }
    }

    /// Emit to several recipients, deduplicated (owner and client user are
    /// often the same account).
    pub async fn emit_all(
        &self,
        recipients: impl IntoIterator<Item = Uuid>,
        appointment_id: Uuid,
        kind: NotificationKind,
    ) {
        let unique: HashSet<Uuid> = recipients.into_iter().collect();
        join_all(
            unique
                .into_iter()
                .map(|recipient| self.emit(recipient, appointment_id, kind)),
        )
        .await;
    }
}
