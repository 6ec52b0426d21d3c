//! Commit controller
//!
//! Small state machine for the two terminal actions of a session:
//! `Idle -> Saving -> Closed` and `Idle -> Clearing -> Reset`.
//! A failed save or clear returns to `Idle` with the working
//! configuration untouched, so the user can retry.

use std::time::Duration;
use tracing::{debug, error, info};

use crate::constants::{alert, timing};
use crate::error::ConfigError;
use crate::fields::is_known_field;
use crate::gateway::{GatewayError, Scope, StorageGateway, Visibility};
use crate::surface::{Alert, PanelHost};
use crate::working::WorkingConfiguration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Idle,
    Saving,
    Closed,
    Clearing,
    Reset,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Idle => "idle",
            CommitState::Saving => "save",
            CommitState::Closed => "closed",
            CommitState::Clearing => "clear",
            CommitState::Reset => "reset",
        }
    }
}

#[derive(Debug)]
pub struct CommitController {
    state: CommitState,
    confirm_delay: Duration,
    confirmation_duration: Duration,
}

impl Default for CommitController {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(timing::SAVE_CONFIRM_DELAY_MS),
            Duration::from_secs(timing::CONFIRMATION_DURATION_SECS),
        )
    }
}

impl CommitController {
    pub fn new(confirm_delay: Duration, confirmation_duration: Duration) -> Self {
        Self {
            state: CommitState::Idle,
            confirm_delay,
            confirmation_duration,
        }
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    /// Whether field edits may be applied right now
    pub fn ensure_idle(&self) -> Result<(), ConfigError> {
        match self.state {
            CommitState::Idle => Ok(()),
            CommitState::Saving | CommitState::Clearing => Err(ConfigError::Busy(self.state.as_str())),
            CommitState::Closed | CommitState::Reset => Err(ConfigError::SessionEnded(self.state.as_str())),
        }
    }

    fn transition(&mut self, next: CommitState) {
        debug!(from = self.state.as_str(), to = next.as_str(), "Commit state transition");
        self.state = next;
    }

    fn alert_failure<H: PanelHost>(&self, host: &mut H, err: &ConfigError) {
        host.alert(&Alert {
            message: err.to_string(),
            duration: self.confirmation_duration,
            display: alert::DISPLAY_ERROR,
        });
    }

    /// Write the whole working configuration as one record, then close
    ///
    /// The snapshot is taken when this is called; later edits never leak
    /// into the write.
    pub async fn save<G, H>(
        &mut self,
        gateway: &G,
        host: &mut H,
        working: &WorkingConfiguration,
    ) -> Result<(), ConfigError>
    where
        G: StorageGateway,
        H: PanelHost,
    {
        self.ensure_idle()?;
        self.transition(CommitState::Saving);

        let snapshot = working.to_record();
        info!(fields = snapshot.len(), "Saving configuration");

        if let Err(source) = gateway.set(Scope::Board, Visibility::Shared, snapshot).await {
            let err = ConfigError::GatewaySave(source);
            error!(error = %err, "Save failed, keeping working configuration");
            self.transition(CommitState::Idle);
            self.alert_failure(host, &err);
            return Err(err);
        }

        // Give the host time to propagate shared data before closing
        tokio::time::sleep(self.confirm_delay).await;

        host.close_panel();
        host.alert(&Alert {
            message: alert::SAVE_SUCCESS_MESSAGE.to_string(),
            duration: self.confirmation_duration,
            display: alert::DISPLAY_SUCCESS,
        });
        self.transition(CommitState::Closed);
        info!("Configuration saved");
        Ok(())
    }

    /// Delete every persisted shared key, then ask the host to reload
    ///
    /// Removes what is actually stored, including keys outside the field
    /// model. Returns the removed key names.
    pub async fn clear<G, H>(&mut self, gateway: &G, host: &mut H) -> Result<Vec<String>, ConfigError>
    where
        G: StorageGateway,
        H: PanelHost,
    {
        self.ensure_idle()?;
        self.transition(CommitState::Clearing);

        let result = async {
            let record = gateway.get_all(Scope::Board, Visibility::Shared).await?;
            let keys: Vec<String> = record.keys().cloned().collect();
            if !keys.is_empty() {
                gateway.remove(Scope::Board, Visibility::Shared, &keys).await?;
            }
            Ok::<_, GatewayError>(keys)
        }
        .await;

        match result {
            Ok(keys) => {
                let legacy = keys.iter().filter(|key| !is_known_field(key)).count();
                info!(removed = keys.len(), legacy, "Cleared configuration");
                self.transition(CommitState::Reset);
                host.reload();
                Ok(keys)
            }
            Err(source) => {
                let err = ConfigError::GatewayClear(source);
                error!(error = %err, "Clear failed, not reloading");
                self.transition(CommitState::Idle);
                self.alert_failure(host, &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;
    use crate::gateway::{MemoryGateway, Record};
    use crate::reducer::{FieldChangeEvent, apply};
    use crate::surface::ConsolePanel;
    use serde_json::{Value, json};

    fn controller() -> CommitController {
        CommitController::new(Duration::ZERO, Duration::from_secs(2))
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_save_writes_exact_fields_and_closes() {
        let gateway = MemoryGateway::new();
        let mut host = ConsolePanel::new();
        let mut working = WorkingConfiguration::new();
        apply(&mut working, &FieldChangeEvent::replace_scalar("total_sprint_days", "10")).unwrap();
        apply(&mut working, &FieldChangeEvent::replace_scalar("is_show_team_size", "True")).unwrap();

        let mut commit = controller();
        commit.save(&gateway, &mut host, &working).await.unwrap();

        let stored = gateway.get_all(Scope::Board, Visibility::Shared).await.unwrap();
        assert_eq!(
            Value::Object(stored),
            json!({"total_sprint_days": "10", "is_show_team_size": "True"})
        );
        assert_eq!(commit.state(), CommitState::Closed);
        assert!(host.is_closed());
        assert_eq!(host.alerts()[0].message, "Configuration Saved Successfully");
        assert_eq!(host.alerts()[0].display, "success");
    }

    #[tokio::test]
    async fn test_failed_save_is_retryable() {
        let gateway = MemoryGateway::new();
        gateway.fail_set(true).await;
        let mut host = ConsolePanel::new();
        let mut working = WorkingConfiguration::new();
        apply(&mut working, &FieldChangeEvent::replace_scalar("sprint_start_day", "Monday")).unwrap();
        let before = working.clone();

        let mut commit = controller();
        let err = commit.save(&gateway, &mut host, &working).await.unwrap_err();
        assert!(matches!(err, ConfigError::GatewaySave(_)));
        assert!(err.is_retryable());
        assert_eq!(commit.state(), CommitState::Idle);
        assert!(!host.is_closed());
        assert_eq!(working, before);

        gateway.fail_set(false).await;
        commit.save(&gateway, &mut host, &working).await.unwrap();
        assert_eq!(
            gateway.get(Scope::Board, Visibility::Shared, Field::SprintStartDay.name()).await.unwrap(),
            Some(json!("Monday"))
        );
    }

    #[tokio::test]
    async fn test_clear_removes_exactly_what_is_stored() {
        let gateway = MemoryGateway::with_shared(record(json!({"A": "1", "B": ["x"], "C": "3"})));
        let mut host = ConsolePanel::new();

        let mut commit = controller();
        let mut removed = commit.clear(&gateway, &mut host).await.unwrap();
        removed.sort();

        assert_eq!(removed, ["A", "B", "C"]);
        assert!(gateway.get_all(Scope::Board, Visibility::Shared).await.unwrap().is_empty());
        assert_eq!(commit.state(), CommitState::Reset);
        assert!(host.reload_requested());
    }

    #[tokio::test]
    async fn test_failed_clear_does_not_reload() {
        let gateway = MemoryGateway::with_shared(record(json!({"sprint_start_day": "Monday"})));
        gateway.fail_remove(true).await;
        let mut host = ConsolePanel::new();

        let mut commit = controller();
        let err = commit.clear(&gateway, &mut host).await.unwrap_err();

        assert!(matches!(err, ConfigError::GatewayClear(_)));
        assert!(!host.reload_requested());
        assert_eq!(commit.state(), CommitState::Idle);
        assert_eq!(host.alerts()[0].display, "error");
        assert_eq!(gateway.get_all(Scope::Board, Visibility::Shared).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_fails_when_record_cannot_be_listed() {
        let gateway = MemoryGateway::with_shared(record(json!({"A": "1"})));
        gateway.fail_get_all(true).await;
        let mut host = ConsolePanel::new();

        let mut commit = controller();
        assert!(commit.clear(&gateway, &mut host).await.is_err());
        assert_eq!(commit.state(), CommitState::Idle);
        assert!(!host.reload_requested());
    }

    #[tokio::test]
    async fn test_no_actions_after_terminal_state() {
        let gateway = MemoryGateway::new();
        let mut host = ConsolePanel::new();
        let working = WorkingConfiguration::new();

        let mut commit = controller();
        commit.clear(&gateway, &mut host).await.unwrap();

        let err = commit.save(&gateway, &mut host, &working).await.unwrap_err();
        assert!(matches!(err, ConfigError::SessionEnded("reset")));
    }
}
