//! The central validator that orchestrates the structural checks.
use super::error::ValidationError;
use super::rules::{bifurcation, loops};
use crate::graph::Topology;
use crate::store::LinkId;
use serde::{Serialize, Deserialize};
use tracing::info;

/// Which structural checks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckSelection {
    Loop,
    Bifurcation,
    #[default]
    All,
}

impl CheckSelection {
    fn includes_loop(self) -> bool { matches!(self, CheckSelection::Loop | CheckSelection::All) }
    fn includes_bifurcation(self) -> bool { matches!(self, CheckSelection::Bifurcation | CheckSelection::All) }
}

/// Outcome of a validator run. `None` marks a check that was not selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub links: usize,
    pub declared_count: Option<usize>,
    pub bifurcation_ok: Option<bool>,
    pub loop_ok: Option<bool>,
    /// Ids referenced as contributors without a record of their own.
    pub undeclared: Vec<LinkId>,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Logical AND over every check that ran.
    pub fn is_valid(&self) -> bool {
        self.bifurcation_ok.unwrap_or(true) && self.loop_ok.unwrap_or(true)
    }
}

/// Structural auditor for a drainage topology.
///
/// Like a linter, it collects every finding before answering, so a malformed
/// network can be diagnosed in one pass.
pub struct TopologyValidator<'a> {
    topology: &'a Topology,
}

impl<'a> TopologyValidator<'a> {
    pub fn new(topology: &'a Topology) -> Self {
        Self { topology }
    }

    /// Every link drains into at most one downstream link.
    pub fn check_downstream_bifurcation(&self) -> Result<(), Vec<ValidationError>> {
        into_result(bifurcation::check_downstream_bifurcation(self.topology))
    }

    /// No declared edge leads back to its downstream link, and every id reached is declared.
    pub fn check_loops(&self) -> Result<(), Vec<ValidationError>> {
        into_result(loops::check_loops(self.topology))
    }

    /// Runs the selected checks and gathers everything into one report.
    pub fn run(&self, selection: CheckSelection) -> ValidationReport {
        let mut report = ValidationReport {
            links: self.topology.len(),
            declared_count: self.topology.declared_count(),
            bifurcation_ok: None,
            loop_ok: None,
            undeclared: self.topology.undeclared().collect(),
            errors: Vec::new(),
        };
        report.undeclared.sort_unstable();

        if selection.includes_bifurcation() {
            let errors = bifurcation::check_downstream_bifurcation(self.topology);
            report.bifurcation_ok = Some(errors.is_empty());
            report.errors.extend(errors);
        }
        if selection.includes_loop() {
            let errors = loops::check_loops(self.topology);
            report.loop_ok = Some(errors.is_empty());
            report.errors.extend(errors);
        }

        info!(
            links = report.links,
            errors = report.errors.len(),
            valid = report.is_valid(),
            "Topology validation finished"
        );
        report
    }

    /// Executes all checks.
    ///
    /// # Returns
    /// - `Ok(())` if no validation errors are found.
    /// - `Err(Vec<ValidationError>)` containing every error discovered.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        into_result(self.run(CheckSelection::All).errors)
    }
}

fn into_result(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
