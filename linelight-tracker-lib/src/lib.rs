//! Train-position classification engine for the linelight indicator strip
//!
//! This library turns one poll's worth of raw train records from the CTA
//! Train Tracker positions feed into exactly one stable display state per
//! monitored station. It is transport- and hardware-agnostic and can be
//! tested without a network or an LED strip.
//!
//! A cycle works through [`Board::apply_cycle`]: every observation is
//! resolved to a station index ([`Topology::resolve_position`]), classified
//! ([`classify`]), and folded into the per-station state vector in feed
//! order. [`Palette`] then maps the finished vector to colors.

pub use rgb::RGB8;

use serde::{Deserialize, Serialize};

mod board;
mod classify;
mod display;
mod topology;

pub use board::Board;
pub use classify::{
    classify, Classification, ClassifierConfig, DestinationRule, FallbackPolicy, TestRunRule,
};
pub use display::Palette;
pub use topology::{IndexPolarity, Station, Topology, TopologyError};

/// Travel direction as reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Northbound,
    Southbound,
}

/// One train from one poll of the positions feed.
///
/// Ephemeral: observations are not retained past the cycle that produced
/// them, and the engine keeps no per-train history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainObservation {
    /// Run number, e.g. "134". Runs in the 3xx block are 5000-series
    /// equipment out of the Cermak yard.
    pub run_number: String,
    /// Destination stop id (`destSt`), e.g. "30171"
    pub destination_id: String,
    /// Destination name (`destNm`), e.g. "O'Hare"
    pub destination_name: String,
    pub direction: Direction,
    /// Stop id of the station the train is heading to (`nextStaId`)
    pub next_station_id: String,
    /// Name of that station, debug output only (`nextStaNm`)
    pub next_station_name: String,
    /// True once the train has reached `next_station_id`, false while it
    /// is still between stations heading toward it.
    pub approaching: bool,
}
