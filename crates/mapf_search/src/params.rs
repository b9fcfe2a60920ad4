//! Search tuning parameters.

use serde::{Deserialize, Serialize};

use mapf_core::FlowMethod;

/// Default ceiling on the searched horizon.
const DEFAULT_HORIZON_CAP: u32 = 200;

/// Parameters for the minimum-horizon searches.
///
/// `total_workers = 1` keeps every search serial. With more workers the
/// rendezvous scan probes consecutive candidates in batches; raising
/// `horizon_workers` additionally probes several candidate horizons at
/// once. Worker counts never change the reported plan, only how fast it
/// is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Inclusive upper bound on the horizon; beyond it the search reports
    /// infeasible.
    pub horizon_cap: u32,
    /// Flow algorithm used for every probe.
    pub method: FlowMethod,
    /// Size of the worker pool backing parallel probes.
    pub total_workers: usize,
    /// Candidate horizons probed concurrently during refinement.
    pub horizon_workers: usize,
    /// Render a progress bar over serial rendezvous scans.
    pub show_progress: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            horizon_cap: DEFAULT_HORIZON_CAP,
            method: FlowMethod::default(),
            total_workers: 1,
            horizon_workers: 1,
            show_progress: false,
        }
    }
}

impl SearchParams {
    pub fn with_horizon_cap(mut self, horizon_cap: u32) -> Self {
        self.horizon_cap = horizon_cap;
        self
    }

    pub fn with_method(mut self, method: FlowMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the worker pool size for parallel probing.
    pub fn with_workers(mut self, total_workers: usize) -> Self {
        self.total_workers = total_workers;
        self
    }

    /// Probe up to `horizon_workers` candidate horizons concurrently.
    pub fn with_horizon_workers(mut self, horizon_workers: usize) -> Self {
        self.horizon_workers = horizon_workers;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn parallel(&self) -> bool {
        self.total_workers > 1
    }

    /// Rendezvous workers granted to each of `active` concurrently probed
    /// horizons: the pool minus one slot per horizon, split evenly, and at
    /// least one each. A lone horizon keeps all but one worker.
    pub fn tau_workers(&self, active: usize) -> usize {
        if active <= 1 {
            self.total_workers.saturating_sub(1).max(1)
        } else {
            (self.total_workers.saturating_sub(active) / active).max(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_split_favors_the_rendezvous_scan() {
        let params = SearchParams::default().with_workers(8);
        assert_eq!(params.tau_workers(1), 7);
        assert_eq!(params.tau_workers(2), 3);
        assert_eq!(params.tau_workers(4), 1);
        assert_eq!(params.tau_workers(8), 1);
    }

    #[test]
    fn serial_defaults_keep_one_worker() {
        let params = SearchParams::default();
        assert!(!params.parallel());
        assert_eq!(params.tau_workers(1), 1);
        assert_eq!(params.tau_workers(3), 1);
    }
}
