//! Reads the buttons and turns their levels into press/release [Edge]s.
//!
//! There is no filtering beyond sampling once per tick: [DEBOUNCE_INTERVAL_MS] between polls is
//! longer than the switches bounce for.

/// Sleep between two polls of the buttons
pub const DEBOUNCE_INTERVAL_MS: u64 = 5;

/// A single button's input line. Wired active-low against a pull-up, so high means released.
pub trait InputLine {
    fn is_high(&mut self) -> bool;
}

/// A detected transition of one button between two consecutive polls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Pressed,
    Released,
}

impl Edge {
    /// Edge between a remembered level and the current one, `None` when nothing changed
    pub fn between(previous_high: bool, current_high: bool) -> Option<Edge> {
        match (previous_high, current_high) {
            (true, false) => Some(Edge::Pressed),
            (false, true) => Some(Edge::Released),
            _ => None,
        }
    }
}

/// The [InputLine]s of all buttons along with the level each had on the previous poll.
pub struct Buttons<L, const N: usize> {
    lines: [L; N],
    previous_high: [bool; N],
}

impl<L: InputLine, const N: usize> Buttons<L, N> {
    /// Every button starts out remembered as released, so the first poll reports only real presses.
    pub fn new(lines: [L; N]) -> Self {
        Buttons {
            lines,
            previous_high: [true; N],
        }
    }

    /// Sample button `index`, remember its level for next time and report any edge.
    pub fn poll(&mut self, index: usize) -> Option<Edge> {
        let current_high = self.lines[index].is_high();
        let edge = Edge::between(self.previous_high[index], current_high);
        self.previous_high[index] = current_high;
        edge
    }

    /// Whether button `index` was held at the last poll
    pub fn is_held(&self, index: usize) -> bool {
        !self.previous_high[index]
    }
}
