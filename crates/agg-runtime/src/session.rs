use std::io::BufRead;
use std::path::Path;

use agg_config::{EngineConfig, EventCatalog};
use agg_core::{AnalyticsContext, Event, Snapshot, SpecUpdate};
use agg_lang::{Form, Specification, Value};
use indexmap::IndexMap;
use orion_error::prelude::*;
use orion_error::{ErrorOwe, ErrorOweBase};

use crate::error::{RuntimeReason, RuntimeResult};
use crate::replay::{ReplayReport, parse_event_line};

/// An [`AnalyticsContext`] wired to its configuration: catalog-checked
/// parsing, configured call depth, file-based specifications, JSONL replay
/// and snapshot files.
pub struct Session {
    ctx: AnalyticsContext,
    catalog: EventCatalog,
}

impl Session {
    pub fn new(config: &EngineConfig) -> Self {
        let ctx = AnalyticsContext::new()
            .with_names(config.catalog.clone())
            .with_max_call_depth(config.engine.max_call_depth);
        Self {
            ctx,
            catalog: config.catalog.clone(),
        }
    }

    pub fn context(&self) -> &AnalyticsContext {
        &self.ctx
    }

    pub fn current_values(&self) -> IndexMap<String, Value> {
        self.ctx.current_values()
    }

    // -----------------------------------------------------------------------
    // Specifications
    // -----------------------------------------------------------------------

    /// Read a JSON specification document and apply it.
    pub fn load_spec(&mut self, path: &Path) -> RuntimeResult<SpecUpdate> {
        let spec = read_spec(path)?;
        self.apply_spec(&spec)
    }

    pub fn apply_spec(&mut self, spec: &Specification) -> RuntimeResult<SpecUpdate> {
        let update = self.ctx.update_with_spec(spec).err_conv()?;
        for (name, e) in &update.rejected {
            agg_warn!(conf, aggregator = %name, error = %e, "aggregator rejected");
        }
        agg_info!(
            conf,
            aggregators = self.ctx.aggregator_names().count(),
            changed = update.changed.len(),
            removed = update.removed.len(),
            rejected = update.rejected.len(),
            replayed = update.replayed,
            "specification applied"
        );
        Ok(update)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Track one event. Catalog mismatches are logged, never rejected.
    pub fn track(&mut self, event: Event) -> RuntimeResult<()> {
        self.check_catalog(&event);
        agg_trace!(pipe, event = ?event.name(), "tracking event");
        self.ctx.track_event(event).err_conv()
    }

    /// Track every JSONL event in `reader`, in order.
    ///
    /// Blank lines are skipped. Malformed lines and events whose evaluation
    /// fails are logged and counted; only read failures abort the replay.
    pub fn replay_reader<R: BufRead>(&mut self, reader: R) -> RuntimeResult<ReplayReport> {
        let mut report = ReplayReport::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line
                .owe(RuntimeReason::Replay)
                .position(format!("line {}", index + 1))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event = match parse_event_line(line) {
                Ok(event) => event,
                Err(e) => {
                    agg_warn!(pipe, line = index + 1, error = %e, "skipping malformed event");
                    report.error_count += 1;
                    continue;
                }
            };
            report.event_count += 1;
            if let Err(e) = self.track(event) {
                agg_warn!(pipe, line = index + 1, error = %e, "event evaluation failed");
                report.error_count += 1;
            }
        }
        agg_info!(
            pipe,
            events = report.event_count,
            errors = report.error_count,
            "replay complete"
        );
        Ok(report)
    }

    pub fn replay_file(&mut self, path: &Path) -> RuntimeResult<ReplayReport> {
        let file = std::fs::File::open(path)
            .owe_sys()
            .position(path.display().to_string())?;
        self.replay_reader(std::io::BufReader::new(file))
    }

    /// Evaluate an ad-hoc form against the current state.
    pub fn eval_form(&self, form: &Form) -> RuntimeResult<Value> {
        self.ctx.eval_form(form).err_conv()
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    pub fn save_snapshot(&self, path: &Path) -> RuntimeResult<()> {
        let json = self.ctx.save_state().to_json().err_conv()?;
        std::fs::write(path, json)
            .owe_sys()
            .position(path.display().to_string())?;
        agg_debug!(res, file = %path.display(), "snapshot written");
        Ok(())
    }

    /// Restore aggregator states from a snapshot file; returns how many
    /// aggregators took a saved state.
    pub fn load_snapshot(&mut self, path: &Path) -> RuntimeResult<usize> {
        let json = std::fs::read_to_string(path)
            .owe_sys()
            .position(path.display().to_string())?;
        let snapshot = Snapshot::from_json(&json)
            .err_conv()
            .position(path.display().to_string())?;
        let restored = self.ctx.restore_state(&snapshot);
        agg_debug!(
            res,
            file = %path.display(),
            restored,
            saved = snapshot.len(),
            "snapshot restored"
        );
        Ok(restored)
    }

    fn check_catalog(&self, event: &Event) {
        if self.catalog.is_empty() {
            return;
        }
        match event.name() {
            Some(name) if !self.catalog.is_known_event(name) => {
                agg_warn!(pipe, event = name, "event not in catalog");
            }
            None => agg_warn!(pipe, "event has no name"),
            Some(_) => {}
        }
        for prop in self.catalog.mistyped(&event.fields) {
            agg_warn!(pipe, event = ?event.name(), prop, "property type differs from catalog");
        }
    }
}

/// Read and parse a JSON specification document.
pub fn read_spec(path: &Path) -> RuntimeResult<Specification> {
    let content = std::fs::read_to_string(path)
        .owe_sys()
        .position(path.display().to_string())?;
    content
        .parse::<Specification>()
        .owe(RuntimeReason::Bootstrap)
        .position(path.display().to_string())
}
