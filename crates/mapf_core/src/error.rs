use std::fmt;

use crate::grid::Cell;

/// Errors raised while validating a planning request.
///
/// Infeasibility is never an error: a well-formed request that admits no
/// collision-free plan reports `Infeasible` through the plan outcome instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Malformed request: ragged grid, out-of-bounds or blocked coordinate,
    /// mismatched capacity list, duplicate starts, unknown solver name.
    InvalidInput(String),
    /// A reservation occupies an agent's start cell at t = 0.
    ReservationConflict(Cell),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
            PlanError::ReservationConflict(cell) => write!(
                f,
                "reservation conflicts with a start position at ({}, {}) at t=0",
                cell.x, cell.y
            ),
        }
    }
}

impl std::error::Error for PlanError {}
