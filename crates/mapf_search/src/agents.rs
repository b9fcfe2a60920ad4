//! Agent snapshots handed to the round planners.

use serde::{Deserialize, Serialize};

use mapf_core::Cell;

/// Whether an agent currently carries cargo. Loaded agents head for drops;
/// empty agents head for pickups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CargoState {
    Empty,
    Loaded,
}

/// One agent at the moment a round is planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: u32,
    pub pos: Cell,
    pub cargo: CargoState,
}

impl AgentState {
    pub fn new(id: u32, pos: Cell, cargo: CargoState) -> Self {
        Self { id, pos, cargo }
    }

    pub fn is_loaded(&self) -> bool {
        self.cargo == CargoState::Loaded
    }
}
