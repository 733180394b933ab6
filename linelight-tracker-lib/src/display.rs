//! Classification → color mapping.

use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::Classification;

/// Total color table for the strip.
///
/// Built once from configuration and then looked up per station per
/// cycle. Every classification has an entry — `NoTrain` maps to off — so
/// rendering can never hit an unmapped state at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub no_train: RGB8,
    pub ohare_bound: RGB8,
    pub forest_park_bound: RGB8,
    pub jefferson_park_bound: RGB8,
    pub uic_bound: RGB8,
    pub both_directions: RGB8,
    pub series_5000: RGB8,
    pub series_7000: RGB8,
    pub holiday_train: RGB8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            no_train: RGB8::new(0, 0, 0),
            ohare_bound: RGB8::new(0, 0, 255),
            forest_park_bound: RGB8::new(255, 0, 0),
            jefferson_park_bound: RGB8::new(0, 80, 255),
            uic_bound: RGB8::new(255, 20, 0),
            both_directions: RGB8::new(255, 0, 255),
            series_5000: RGB8::new(0, 80, 0),
            series_7000: RGB8::new(255, 255, 255),
            holiday_train: RGB8::new(255, 160, 0),
        }
    }
}

impl Palette {
    /// Color for one classification.
    #[must_use]
    pub const fn color(&self, classification: Classification) -> RGB8 {
        match classification {
            Classification::NoTrain => self.no_train,
            Classification::OHareBound => self.ohare_bound,
            Classification::ForestParkBound => self.forest_park_bound,
            Classification::JeffersonParkBound => self.jefferson_park_bound,
            Classification::UICBound => self.uic_bound,
            Classification::BothDirections => self.both_directions,
            Classification::Series5000 => self.series_5000,
            Classification::Series7000 => self.series_7000,
            Classification::HolidayTrain => self.holiday_train,
        }
    }

    /// Map a finished state vector to colors, in strip order.
    pub fn render<'a>(
        &'a self,
        states: &'a [Classification],
    ) -> impl Iterator<Item = RGB8> + 'a {
        states.iter().map(|&c| self.color(c))
    }
}
