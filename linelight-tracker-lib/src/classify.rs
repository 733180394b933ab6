//! Per-train classification rules.

use log::warn;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{Direction, TrainObservation};

/// Display state for one station.
///
/// `BothDirections` is reachable only when opposing directional trains
/// meet at the same station; the three equipment classifications override
/// everything and stick for the rest of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// No train affects the station this cycle
    NoTrain,
    OHareBound,
    ForestParkBound,
    JeffersonParkBound,
    UICBound,
    BothDirections,
    /// 5000-series equipment out of the Cermak yard (3xx run number)
    Series5000,
    /// Designated 7000-series test run (time-gated rule)
    Series7000,
    HolidayTrain,
}

impl Classification {
    /// Non-directional classifications replace whatever is already shown
    /// at a station and cannot be cleared by a directional observation in
    /// the same cycle.
    #[must_use]
    pub const fn is_override(self) -> bool {
        matches!(
            self,
            Self::Series5000 | Self::Series7000 | Self::HolidayTrain
        )
    }

    #[must_use]
    pub const fn is_directional(self) -> bool {
        matches!(
            self,
            Self::OHareBound | Self::ForestParkBound | Self::JeffersonParkBound | Self::UICBound
        )
    }
}

/// Destination matcher for one branch. A train matches when its `destSt`
/// id or `destNm` name equals any configured value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRule {
    pub station_ids: SmallVec<[String; 2]>,
    pub names: SmallVec<[String; 2]>,
}

impl DestinationRule {
    pub fn new(station_ids: &[&str], names: &[&str]) -> Self {
        Self {
            station_ids: station_ids.iter().map(|s| (*s).to_string()).collect(),
            names: names.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn matches(&self, obs: &TrainObservation) -> bool {
        self.station_ids.iter().any(|id| *id == obs.destination_id)
            || self.names.iter().any(|name| *name == obs.destination_name)
    }
}

/// What to classify a train whose destination matches no configured
/// branch. Early firmware always defaulted to O'Hare regardless of
/// travel direction; the direction-aware policy is the intended behavior
/// and the legacy one is kept selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    #[default]
    DirectionAware,
    AlwaysOHare,
}

/// Time-gated 7000-series test run rule.
///
/// Matches only while the local hour is below `cutoff_hour`, so the strip
/// stops flagging the run once the morning test window has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunRule {
    pub run_number: String,
    #[serde(default = "default_cutoff_hour")]
    pub cutoff_hour: u8,
}

const fn default_cutoff_hour() -> u8 {
    12
}

/// Classifier configuration. Defaults cover the Blue Line terminals and
/// the holiday train's traditional run number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Run number of the holiday train, if one is in service
    #[serde(default = "default_holiday_run")]
    pub holiday_run: Option<String>,
    /// Optional test run rule; absent disables it entirely
    #[serde(default)]
    pub test_run: Option<TestRunRule>,
    pub ohare: DestinationRule,
    pub forest_park: DestinationRule,
    pub jefferson_park: DestinationRule,
    pub uic: DestinationRule,
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

fn default_holiday_run() -> Option<String> {
    Some("1225".to_string())
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            holiday_run: default_holiday_run(),
            test_run: None,
            ohare: DestinationRule::new(&["30171"], &["O'Hare"]),
            forest_park: DestinationRule::new(&["30077"], &["Forest Park"]),
            jefferson_park: DestinationRule::new(
                &["30247", "30159"],
                &["Jefferson Park", "Rosemont"],
            ),
            uic: DestinationRule::new(&["30069", "30093"], &["UIC-Halsted", "Racine"]),
            fallback: FallbackPolicy::default(),
        }
    }
}

/// Classify one train observation. Rules are evaluated in order and the
/// first match wins; equipment rules run before destination rules so a
/// 5000-series run is flagged no matter where it is headed.
///
/// `local_hour` is the local wall-clock hour in `[0, 24)`, injected by
/// the caller so the time-gated test-run rule stays deterministic under
/// test. `None` disables that rule for the cycle.
#[must_use]
pub fn classify(
    obs: &TrainObservation,
    config: &ClassifierConfig,
    local_hour: Option<u8>,
) -> Classification {
    // Cermak-yard runs are numbered 3xx
    if obs.run_number.starts_with('3') {
        return Classification::Series5000;
    }

    if config.holiday_run.as_deref() == Some(obs.run_number.as_str()) {
        return Classification::HolidayTrain;
    }

    if let (Some(rule), Some(hour)) = (&config.test_run, local_hour) {
        if obs.run_number == rule.run_number && hour < rule.cutoff_hour {
            return Classification::Series7000;
        }
    }

    if config.ohare.matches(obs) {
        return Classification::OHareBound;
    }
    if config.forest_park.matches(obs) {
        return Classification::ForestParkBound;
    }
    if config.jefferson_park.matches(obs) {
        return Classification::JeffersonParkBound;
    }
    if config.uic.matches(obs) {
        return Classification::UICBound;
    }

    // Unrecognized destination: usually means the feed grew a destination
    // this table doesn't know about, so flag it before falling back.
    warn!(
        "run {} has unrecognized destination {} ({:?}), applying {:?} fallback",
        obs.run_number, obs.destination_id, obs.destination_name, config.fallback
    );
    match config.fallback {
        FallbackPolicy::AlwaysOHare => Classification::OHareBound,
        FallbackPolicy::DirectionAware => match obs.direction {
            Direction::Northbound => Classification::OHareBound,
            Direction::Southbound => Classification::ForestParkBound,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(run: &str, dest_id: &str, dest_name: &str, direction: Direction) -> TrainObservation {
        TrainObservation {
            run_number: run.to_string(),
            destination_id: dest_id.to_string(),
            destination_name: dest_name.to_string(),
            direction,
            next_station_id: "40390".to_string(),
            next_station_name: String::new(),
            approaching: true,
        }
    }

    #[test]
    fn test_cermak_run_beats_destination() {
        let config = ClassifierConfig::default();
        let o = obs("301", "30171", "O'Hare", Direction::Northbound);
        assert_eq!(classify(&o, &config, None), Classification::Series5000);
    }

    #[test]
    fn test_empty_run_number_is_not_cermak() {
        let config = ClassifierConfig::default();
        let o = obs("", "30171", "O'Hare", Direction::Northbound);
        assert_eq!(classify(&o, &config, None), Classification::OHareBound);
    }

    #[test]
    fn test_holiday_run() {
        let config = ClassifierConfig::default();
        let o = obs("1225", "30171", "O'Hare", Direction::Northbound);
        assert_eq!(classify(&o, &config, None), Classification::HolidayTrain);
    }

    #[test]
    fn test_destination_matching_by_id_and_name() {
        let config = ClassifierConfig::default();
        assert_eq!(
            classify(&obs("100", "30077", "", Direction::Northbound), &config, None),
            Classification::ForestParkBound
        );
        assert_eq!(
            classify(&obs("100", "", "Forest Park", Direction::Northbound), &config, None),
            Classification::ForestParkBound
        );
        assert_eq!(
            classify(&obs("100", "30159", "", Direction::Northbound), &config, None),
            Classification::JeffersonParkBound
        );
        assert_eq!(
            classify(&obs("100", "", "Racine", Direction::Southbound), &config, None),
            Classification::UICBound
        );
    }

    #[test]
    fn test_direction_aware_fallback() {
        let config = ClassifierConfig::default();
        assert_eq!(
            classify(&obs("100", "99999", "Nowhere", Direction::Southbound), &config, None),
            Classification::ForestParkBound
        );
        assert_eq!(
            classify(&obs("100", "99999", "Nowhere", Direction::Northbound), &config, None),
            Classification::OHareBound
        );
    }

    #[test]
    fn test_legacy_fallback_ignores_direction() {
        let config = ClassifierConfig {
            fallback: FallbackPolicy::AlwaysOHare,
            ..ClassifierConfig::default()
        };
        assert_eq!(
            classify(&obs("100", "99999", "Nowhere", Direction::Southbound), &config, None),
            Classification::OHareBound
        );
    }

    #[test]
    fn test_test_run_gated_by_hour() {
        let config = ClassifierConfig {
            test_run: Some(TestRunRule {
                run_number: "700".to_string(),
                cutoff_hour: 12,
            }),
            ..ClassifierConfig::default()
        };
        let o = obs("700", "30171", "O'Hare", Direction::Northbound);

        assert_eq!(classify(&o, &config, Some(9)), Classification::Series7000);
        // At or past the cutoff the run classifies by destination again
        assert_eq!(classify(&o, &config, Some(12)), Classification::OHareBound);
        assert_eq!(classify(&o, &config, Some(15)), Classification::OHareBound);
        // No clock supplied: the rule is inert
        assert_eq!(classify(&o, &config, None), Classification::OHareBound);
    }

    #[test]
    fn test_test_run_disabled_when_unconfigured() {
        let config = ClassifierConfig::default();
        let o = obs("700", "30171", "O'Hare", Direction::Northbound);
        assert_eq!(classify(&o, &config, Some(9)), Classification::OHareBound);
    }
}
