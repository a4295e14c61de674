//! Address validation of movement programs.

use std::fmt;

use lanes_arch::{AddressError, ArchSpec};
use lanes_ir::{MoveProgram, Op, ProgramPoint};
use tracing::{debug, warn};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// One invalid address found by [`AddressValidation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The offending statement.
    pub point: ProgramPoint,
    /// Its operation name.
    pub op: &'static str,
    /// What is wrong.
    pub error: AddressError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.point, self.op, self.error)
    }
}

/// Summary stored by a successful [`AddressValidation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    /// Statements inspected.
    pub statements_checked: usize,
    /// Addresses inspected.
    pub addresses_checked: usize,
}

/// Analysis pass that checks every location, lane and zone of the program
/// against the architecture, plus lane compatibility within each `Move`.
///
/// All problems are collected before failing with
/// [`CompileError::Validation`].
pub struct AddressValidation;

impl Pass for AddressValidation {
    fn name(&self) -> &'static str {
        "address_validation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, program: &mut MoveProgram, properties: &mut PropertySet) -> CompileResult<()> {
        let arch = properties.require_arch()?;
        let mut diagnostics = Vec::new();
        let mut report = ValidationReport {
            statements_checked: 0,
            addresses_checked: 0,
        };

        for (point, stmt) in program.statements() {
            report.statements_checked += 1;
            report.addresses_checked += check_op(arch, &stmt.op, |error| {
                diagnostics.push(Diagnostic {
                    point,
                    op: stmt.op.name(),
                    error,
                });
            });
        }

        if !diagnostics.is_empty() {
            for diagnostic in &diagnostics {
                warn!("{diagnostic}");
            }
            return Err(CompileError::Validation(diagnostics));
        }
        debug!(
            statements = report.statements_checked,
            addresses = report.addresses_checked,
            "Address validation passed"
        );
        properties.insert(report);
        Ok(())
    }
}

/// Report every problem with one operation; returns the addresses checked.
fn check_op(arch: &ArchSpec, op: &Op, mut report: impl FnMut(AddressError)) -> usize {
    let mut checked = 0;
    for &location in op.locations() {
        checked += 1;
        if let Err(e) = arch.validate_location(location) {
            report(e);
        }
    }
    for &zone in op.zones() {
        checked += 1;
        if let Err(e) = arch.validate_zone(zone) {
            report(e);
        }
    }
    let lanes = op.lanes();
    for lane in lanes {
        checked += 1;
        if let Err(e) = arch.validate_lane(lane) {
            report(e);
        }
    }
    for (i, first) in lanes.iter().enumerate() {
        for second in &lanes[i + 1..] {
            if !arch.compatible_lanes(first, second) {
                report(AddressError::IncompatibleLanes {
                    first: *first,
                    second: *second,
                });
            }
        }
    }
    checked
}
