//! Board task and render sink.
//!
//! Receives observation batches from the poller, folds each one through
//! the engine, and writes one color per station to the render sink. A
//! cycle only happens when a batch arrives, so a failed poll leaves the
//! previous colors on the strip.

use std::io::{self, Write};
use std::sync::mpsc::Receiver;

use chrono::{Local, Timelike};
use linelight_tracker_lib::{Board, ClassifierConfig, Palette, Topology, RGB8};
use log::{debug, info, warn};
use smart_leds::{brightness, gamma, SmartLedsWrite};

use crate::config::DisplayConfig;
use crate::feed::ObservationBatch;

/// ANSI truecolor rendering of the strip, one block per station.
///
/// Stands in for a real LED driver behind the same write trait, so the
/// board task doesn't care whether it is talking to a terminal or
/// hardware.
pub struct TerminalStrip {
    out: io::Stdout,
}

impl TerminalStrip {
    #[must_use]
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for TerminalStrip {
    fn default() -> Self {
        Self::new()
    }
}

impl SmartLedsWrite for TerminalStrip {
    type Error = io::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let mut line = String::new();
        for color in iterator {
            let color = color.into();
            line.push_str(&format!(
                "\x1b[38;2;{};{};{}m\u{2588}",
                color.r, color.g, color.b
            ));
        }
        line.push_str("\x1b[0m");

        let mut out = self.out.lock();
        write!(out, "\r{line}")?;
        out.flush()
    }
}

/// Run the board task until the feed channel closes.
pub fn board_task<W>(
    topology: &Topology,
    classifier: &ClassifierConfig,
    display: &DisplayConfig,
    rx: &Receiver<ObservationBatch>,
    strip: &mut W,
) where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: std::fmt::Display,
{
    let mut board = Board::new(topology.len());
    info!("Board task started ({} stations)", topology.len());

    while let Ok(batch) = rx.recv() {
        board.apply_cycle(topology, classifier, &batch, Some(local_hour()));
        log_board(topology, &board);

        let colors: Vec<RGB8> = display.palette.render(board.states()).collect();
        // Gamma correction first, then brightness reduction, as
        // recommended by the smart-leds docs
        if let Err(e) = strip.write(brightness(gamma(colors.into_iter()), display.brightness)) {
            warn!("Strip write failed: {e}");
        }
    }

    info!("Feed channel closed, board task exiting");
}

/// Local wall-clock hour for the time-gated classifier rule.
fn local_hour() -> u8 {
    // Hours are 0-23, the cast cannot truncate
    #[allow(clippy::cast_possible_truncation)]
    let hour = Local::now().hour() as u8;
    hour
}

fn log_board(topology: &Topology, board: &Board) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    for (station, state) in topology.stations().iter().zip(board.states()) {
        debug!("Station {} state: {state:?} ({})", station.id, station.name);
    }
}
