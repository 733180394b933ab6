//! Per-cycle aggregation of classified observations.

use log::{debug, warn};

use crate::{classify, Classification, ClassifierConfig, Topology, TrainObservation};

/// The per-station state vector for the current cycle.
///
/// Reset at the start of every successful poll cycle, written by the fold,
/// and read once at cycle end by the display mapping. Nothing here
/// persists across cycles; a failed poll simply skips the cycle and the
/// previous vector stays on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    states: Vec<Classification>,
}

impl Board {
    #[must_use]
    pub fn new(stations: usize) -> Self {
        Self {
            states: vec![Classification::NoTrain; stations],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The finished state vector, indexed by strip position.
    #[must_use]
    pub fn states(&self) -> &[Classification] {
        &self.states
    }

    /// Clear every station back to `NoTrain` (cycle start).
    pub fn reset(&mut self) {
        self.states.fill(Classification::NoTrain);
    }

    /// Fold one classified observation into the station at `index`.
    ///
    /// Feed order is authoritative: the caller folds observations in the
    /// order received, which gives last-write-wins semantics for the
    /// override classifications. An out-of-range index is ignored.
    pub fn fold(&mut self, index: usize, incoming: Classification) {
        if let Some(slot) = self.states.get_mut(index) {
            *slot = merge(*slot, incoming);
        }
    }

    /// Run one full aggregation cycle: reset, then resolve, classify and
    /// fold every observation in feed order.
    ///
    /// Observations whose next station is not on the line are dropped
    /// with a diagnostic; everything else degrades per-observation, never
    /// per-cycle.
    pub fn apply_cycle(
        &mut self,
        topology: &Topology,
        config: &ClassifierConfig,
        observations: &[TrainObservation],
        local_hour: Option<u8>,
    ) {
        self.reset();
        for obs in observations {
            let Some(index) = topology.resolve_position(obs) else {
                warn!(
                    "unknown station {} ({:?}), dropping run {}",
                    obs.next_station_id, obs.next_station_name, obs.run_number
                );
                continue;
            };
            let classification = classify(obs, config, local_hour);
            debug!(
                "run {} to {:?}: {classification:?} at index {index}",
                obs.run_number, obs.destination_name
            );
            self.fold(index, classification);
        }
    }
}

/// Merge rule for one observation against the current station state.
///
/// Override classifications win unconditionally, so the last one folded
/// at an index is the one displayed. Directional observations claim an
/// empty station, escalate an opposing one to `BothDirections`, and
/// otherwise leave the state alone — in particular they can never clear
/// an override or demote `BothDirections`.
fn merge(current: Classification, incoming: Classification) -> Classification {
    use Classification::{
        BothDirections, ForestParkBound, JeffersonParkBound, NoTrain, OHareBound, UICBound,
    };

    if incoming.is_override() {
        return incoming;
    }

    match (current, incoming) {
        (NoTrain, _) => incoming,
        (OHareBound | JeffersonParkBound, ForestParkBound | UICBound)
        | (ForestParkBound | UICBound, OHareBound | JeffersonParkBound) => BothDirections,
        _ => current,
    }
}
