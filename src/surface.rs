//! Widget surface and panel host seams
//!
//! The engine pushes options and selections out through [`WidgetSurface`]
//! and asks the host to close, alert or reload through [`PanelHost`].
//! Field changes flow the other way as `FieldChangeEvent`s.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use crate::fields::{Encoding, Field, decode_bool};
use crate::options::WidgetOption;
use crate::working::FieldValue;

pub trait WidgetSurface {
    /// Replace the choices a field's widget offers
    fn set_options(&mut self, field: Field, options: &[WidgetOption]);

    /// Show a value (or set of values) as selected
    fn set_selected(&mut self, field: Field, value: &FieldValue);

    /// Inputs are disabled while a save or clear is in flight
    fn set_enabled(&mut self, enabled: bool);
}

/// Transient host notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub duration: Duration,
    pub display: &'static str,
}

pub trait PanelHost {
    fn close_panel(&mut self);
    fn alert(&mut self, alert: &Alert);
    /// Rebuild the hosting view from scratch
    fn reload(&mut self);
}

#[derive(Debug, Default)]
struct FieldView {
    options: Option<Vec<WidgetOption>>,
    selected: Option<FieldValue>,
}

/// Text rendition of the panel for the command line
#[derive(Debug)]
pub struct ConsolePanel {
    fields: BTreeMap<Field, FieldView>,
    enabled: bool,
    closed: bool,
    reload_requested: bool,
    alerts: Vec<Alert>,
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
            enabled: true,
            closed: false,
            reload_requested: false,
            alerts: Vec::new(),
        }
    }
}

impl ConsolePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn reload_requested(&self) -> bool {
        self.reload_requested
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Render every field with its selection and available choices
    pub fn render(&self) -> String {
        let mut out = String::new();
        let state = if self.enabled { "" } else { " (inputs disabled)" };
        let _ = writeln!(out, "Configure Sprint Burndown{state}");

        for field in Field::ALL {
            let view = self.fields.get(&field);
            let selected = view.and_then(|v| v.selected.as_ref());
            let toggle = field.encoding() == Encoding::BooleanToken;
            let shown = match (toggle, selected) {
                (true, Some(FieldValue::Scalar(token))) => match decode_bool(token) {
                    Some(true) => "[x]".to_string(),
                    Some(false) => "[ ]".to_string(),
                    None => format!("[?] {token}"),
                },
                (true, _) => "[ ]".to_string(),
                (false, Some(value)) => self.describe(field, value),
                (false, None) => "-".to_string(),
            };
            let _ = writeln!(out, "  {:<32} {}", format!("{}:", field.label()), shown);

            if let Some(options) = view.and_then(|v| v.options.as_ref()) {
                let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
                if labels.is_empty() {
                    let _ = writeln!(out, "  {:<32} (no choices)", "");
                } else {
                    let _ = writeln!(out, "  {:<32} choices: {}", "", labels.join(", "));
                }
            }
        }
        out
    }

    /// Prefer option labels over raw ids when they are known
    fn describe(&self, field: Field, value: &FieldValue) -> String {
        let options = self.fields.get(&field).and_then(|v| v.options.as_ref());
        let label = |id: &str| -> String {
            options
                .and_then(|opts| opts.iter().find(|o| o.value == id))
                .map(|o| o.label.clone())
                .unwrap_or_else(|| id.to_string())
        };
        match value {
            FieldValue::Scalar(id) => label(id),
            FieldValue::Set(ids) if ids.is_empty() => "(none)".to_string(),
            FieldValue::Set(ids) => ids.iter().map(|id| label(id)).collect::<Vec<_>>().join(", "),
        }
    }
}

impl WidgetSurface for ConsolePanel {
    fn set_options(&mut self, field: Field, options: &[WidgetOption]) {
        self.fields.entry(field).or_default().options = Some(options.to_vec());
    }

    fn set_selected(&mut self, field: Field, value: &FieldValue) {
        self.fields.entry(field).or_default().selected = Some(value.clone());
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl PanelHost for ConsolePanel {
    fn close_panel(&mut self) {
        self.closed = true;
    }

    fn alert(&mut self, alert: &Alert) {
        self.alerts.push(alert.clone());
    }

    fn reload(&mut self) {
        self.reload_requested = true;
        self.fields.clear();
    }
}
