//! One editing session of the configuration panel
//!
//! Wires the hydration loader, the selection reducer and the commit
//! controller to a storage gateway and a panel. Events are handled one at a
//! time; while a save or clear is in flight the inputs are disabled and
//! edits are refused.

use tracing::{debug, info, warn};

use crate::commit::{CommitController, CommitState};
use crate::error::ConfigError;
use crate::fields::Field;
use crate::gateway::StorageGateway;
use crate::hydration::{Hydration, hydrate};
use crate::options::BoardCatalog;
use crate::reducer::{FieldChangeEvent, reduce};
use crate::surface::{PanelHost, WidgetSurface};
use crate::working::WorkingConfiguration;

pub struct ConfigSession<G, P> {
    gateway: G,
    panel: P,
    catalog: Option<BoardCatalog>,
    working: WorkingConfiguration,
    commit: CommitController,
}

impl<G, P> ConfigSession<G, P>
where
    G: StorageGateway,
    P: WidgetSurface + PanelHost,
{
    pub fn new(gateway: G, panel: P, commit: CommitController) -> Self {
        Self {
            gateway,
            panel,
            catalog: None,
            working: WorkingConfiguration::new(),
            commit,
        }
    }

    /// Board data used to populate selection widgets
    pub fn with_catalog(mut self, catalog: BoardCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn working(&self) -> &WorkingConfiguration {
        &self.working
    }

    pub fn state(&self) -> CommitState {
        self.commit.state()
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Entry point for the launcher: load persisted state and fill the panel
    pub async fn open_panel(&mut self) -> Result<Hydration, ConfigError> {
        self.commit.ensure_idle()?;

        let hydration = hydrate(&self.gateway).await;
        if !hydration.is_complete() {
            warn!(failures = hydration.failures.len(), "Some fields could not be loaded and are left empty");
        }
        self.working = hydration.working.clone();
        if self.working.is_empty() {
            debug!("No persisted configuration, starting empty");
        }

        if let Some(catalog) = &self.catalog {
            for field in Field::ALL {
                if let Some(options) = catalog.options_for(field) {
                    self.panel.set_options(field, &options);
                }
            }
        }
        for (field, value) in &hydration.preselected {
            self.panel.set_selected(*field, value);
        }
        self.panel.set_enabled(true);

        info!(
            fields = self.working.len(),
            failures = hydration.failures.len(),
            "Opened configuration panel"
        );
        Ok(hydration)
    }

    /// Apply one widget change to the working configuration
    pub fn on_field_change(&mut self, event: &FieldChangeEvent) -> Result<(), ConfigError> {
        self.commit.ensure_idle().inspect_err(|err| {
            warn!(field = %event.field, error = %err, "Refusing field change");
        })?;
        self.working = reduce(&self.working, event)?;

        // Keep the widget in step with what will be saved
        if let Some((field, value)) = Field::from_name(&event.field)
            .and_then(|field| self.working.get(field).map(|value| (field, value)))
        {
            self.panel.set_selected(field, value);
        }
        Ok(())
    }

    pub async fn save(&mut self) -> Result<(), ConfigError> {
        // A refused save never touches the inputs
        self.commit.ensure_idle()?;
        self.panel.set_enabled(false);
        let result = self
            .commit
            .save(&self.gateway, &mut self.panel, &self.working)
            .await;
        if result.is_err() {
            self.panel.set_enabled(true);
        }
        result
    }

    /// Delete the persisted record; the working copy is discarded on success
    pub async fn clear(&mut self) -> Result<Vec<String>, ConfigError> {
        self.commit.ensure_idle()?;
        self.panel.set_enabled(false);
        let result = self.commit.clear(&self.gateway, &mut self.panel).await;
        match &result {
            Ok(_) => self.working = WorkingConfiguration::new(),
            Err(_) => self.panel.set_enabled(true),
        }
        result
    }
}
