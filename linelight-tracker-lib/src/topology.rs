//! Station table and position resolution.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Direction, TrainObservation};

/// Which terminal of the line sits at index 0 of the strip.
///
/// The station list has shipped in both orderings, and the sign of the
/// "previous station" offset flips with it, so the polarity is a
/// configuration value derived from the list rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexPolarity {
    /// Index 0 is Forest Park; indices increase toward O'Hare.
    #[default]
    ForestParkFirst,
    /// Index 0 is O'Hare; indices increase toward Forest Park.
    OHareFirst,
}

/// One monitored station. `name` is used for debug output only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Stop id as it appears in the feed's `nextStaId`, e.g. "40390"
    pub id: String,
    pub name: String,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Error building a [`Topology`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The station list was empty
    Empty,
    /// Two stations share a stop id
    DuplicateId(String),
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "station list is empty"),
            Self::DuplicateId(id) => write!(f, "duplicate station id {id}"),
        }
    }
}

impl std::error::Error for TopologyError {}

/// The fixed, ordered set of monitored stations.
///
/// Immutable after construction: the station count and index assignment
/// hold for the life of the process, and index `i` is the `i`-th
/// indicator on the strip.
#[derive(Debug, Clone)]
pub struct Topology {
    stations: Vec<Station>,
    /// Stop id → strip index. Insertion order matches `stations`.
    index: IndexMap<String, usize>,
    polarity: IndexPolarity,
}

impl Topology {
    /// Build a topology from an ordered station list.
    pub fn new(stations: Vec<Station>, polarity: IndexPolarity) -> Result<Self, TopologyError> {
        if stations.is_empty() {
            return Err(TopologyError::Empty);
        }
        let mut index = IndexMap::with_capacity(stations.len());
        for (i, station) in stations.iter().enumerate() {
            if index.insert(station.id.clone(), i).is_some() {
                return Err(TopologyError::DuplicateId(station.id.clone()));
            }
        }
        Ok(Self {
            stations,
            index,
            polarity,
        })
    }

    /// The Blue Line, ordered Forest Park first to match the physical
    /// strip this ships with.
    #[must_use]
    pub fn blue_line() -> Self {
        let stations = BLUE_LINE
            .iter()
            .map(|&(id, name)| Station::new(id, name))
            .collect();
        // The built-in table has distinct ids and is non-empty
        Self::new(stations, IndexPolarity::ForestParkFirst)
            .expect("built-in Blue Line station table is valid")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    #[must_use]
    pub fn polarity(&self) -> IndexPolarity {
        self.polarity
    }

    #[must_use]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Strip index for a stop id.
    ///
    /// `None` means the id is not on the monitored line; callers must
    /// drop the observation rather than defaulting to an index.
    #[must_use]
    pub fn index_of(&self, station_id: &str) -> Option<usize> {
        self.index.get(station_id).copied()
    }

    /// Station index an observation affects this cycle.
    ///
    /// An approaching train lights its next station. A train between
    /// stations lights the neighbor it last departed, which is one step
    /// against its direction of travel; the sign of that step follows the
    /// configured polarity. At either end of the strip the offset is
    /// dropped rather than leaving the valid range.
    ///
    /// `None` means `next_station_id` is not on the line and the
    /// observation should be discarded.
    #[must_use]
    pub fn resolve_position(&self, obs: &TrainObservation) -> Option<usize> {
        let next = self.index_of(&obs.next_station_id)?;
        if obs.approaching {
            return Some(next);
        }

        let toward_lower_index = matches!(
            (self.polarity, obs.direction),
            (IndexPolarity::ForestParkFirst, Direction::Northbound)
                | (IndexPolarity::OHareFirst, Direction::Southbound)
        );
        Some(if toward_lower_index {
            next.saturating_sub(1)
        } else {
            (next + 1).min(self.stations.len() - 1)
        })
    }
}

/// Blue Line stop ids and names, Forest Park terminal first.
const BLUE_LINE: &[(&str, &str)] = &[
    ("40390", "Forest Park"),
    ("40980", "Harlem (Forest Park Branch)"),
    ("40180", "Oak Park"),
    ("40010", "Austin"),
    ("40970", "Cicero"),
    ("40920", "Pulaski"),
    ("40250", "Kedzie-Homan"),
    ("40220", "Western (Forest Park Branch)"),
    ("40810", "Illinois Medical District"),
    ("40470", "Racine"),
    ("40350", "UIC-Halsted"),
    ("40430", "Clinton"),
    ("41340", "LaSalle"),
    ("40070", "Jackson"),
    ("40790", "Monroe"),
    ("40370", "Washington"),
    ("40380", "Clark/Lake"),
    ("40490", "Grand"),
    ("41410", "Chicago"),
    ("40320", "Division"),
    ("40590", "Damen"),
    ("40670", "Western (O'Hare Branch)"),
    ("40570", "California"),
    ("41020", "Logan Square"),
    ("40060", "Belmont"),
    ("41240", "Addison"),
    ("40550", "Irving Park"),
    ("41330", "Montrose"),
    ("41280", "Jefferson Park"),
    ("40750", "Harlem (O'Hare Branch)"),
    ("40230", "Cumberland"),
    ("40820", "Rosemont"),
    ("40890", "O'Hare"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(next: &str, direction: Direction, approaching: bool) -> TrainObservation {
        TrainObservation {
            run_number: "100".to_string(),
            destination_id: "30171".to_string(),
            destination_name: "O'Hare".to_string(),
            direction,
            next_station_id: next.to_string(),
            next_station_name: String::new(),
            approaching,
        }
    }

    fn three_stations(polarity: IndexPolarity) -> Topology {
        Topology::new(
            vec![
                Station::new("A", "Alpha"),
                Station::new("B", "Bravo"),
                Station::new("C", "Charlie"),
            ],
            polarity,
        )
        .unwrap()
    }

    #[test]
    fn test_index_lookup() {
        let topo = three_stations(IndexPolarity::ForestParkFirst);
        assert_eq!(topo.index_of("A"), Some(0));
        assert_eq!(topo.index_of("C"), Some(2));
        assert_eq!(topo.index_of("Z"), None);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = Topology::new(
            vec![Station::new("A", "Alpha"), Station::new("A", "Alpha 2")],
            IndexPolarity::ForestParkFirst,
        )
        .unwrap_err();
        assert_eq!(err, TopologyError::DuplicateId("A".to_string()));
    }

    #[test]
    fn test_empty_rejected() {
        let err = Topology::new(vec![], IndexPolarity::ForestParkFirst).unwrap_err();
        assert_eq!(err, TopologyError::Empty);
    }

    #[test]
    fn test_approaching_uses_next_station() {
        let topo = three_stations(IndexPolarity::ForestParkFirst);
        let result = topo.resolve_position(&obs("B", Direction::Northbound, true));
        assert_eq!(result, Some(1));
    }

    #[test]
    fn test_between_stations_forest_park_first() {
        let topo = three_stations(IndexPolarity::ForestParkFirst);
        // Northbound toward B: last departed A
        assert_eq!(
            topo.resolve_position(&obs("B", Direction::Northbound, false)),
            Some(0)
        );
        // Southbound toward B: last departed C
        assert_eq!(
            topo.resolve_position(&obs("B", Direction::Southbound, false)),
            Some(2)
        );
    }

    #[test]
    fn test_between_stations_ohare_first() {
        let topo = three_stations(IndexPolarity::OHareFirst);
        // With O'Hare at index 0 the offsets flip
        assert_eq!(
            topo.resolve_position(&obs("B", Direction::Northbound, false)),
            Some(2)
        );
        assert_eq!(
            topo.resolve_position(&obs("B", Direction::Southbound, false)),
            Some(0)
        );
    }

    #[test]
    fn test_offset_dropped_at_boundaries() {
        let topo = three_stations(IndexPolarity::ForestParkFirst);
        // Northbound toward index 0: no station below 0, offset dropped
        assert_eq!(
            topo.resolve_position(&obs("A", Direction::Northbound, false)),
            Some(0)
        );
        // Southbound toward the last index: no station above it
        assert_eq!(
            topo.resolve_position(&obs("C", Direction::Southbound, false)),
            Some(2)
        );
    }

    #[test]
    fn test_unknown_next_station_is_not_found() {
        let topo = three_stations(IndexPolarity::ForestParkFirst);
        assert_eq!(topo.resolve_position(&obs("Z", Direction::Northbound, true)), None);
    }

    #[test]
    fn test_blue_line_table() {
        let topo = Topology::blue_line();
        assert_eq!(topo.len(), 33);
        assert_eq!(topo.index_of("40390"), Some(0)); // Forest Park
        assert_eq!(topo.index_of("40890"), Some(32)); // O'Hare
        assert_eq!(topo.polarity(), IndexPolarity::ForestParkFirst);
    }
}
