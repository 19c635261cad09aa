//! Binds the hardware-independent capabilities of [crate::scan], [crate::macropad] and
//! [crate::lighting] to the RP2040's GPIO and PIO peripherals.

use crate::lighting::{Brightness, LightingOutput, Rgb, LED_COUNT};
use crate::macropad::StatusIndicator;
use crate::scan::InputLine;
use embassy_rp::{
    gpio::{Input, Level, Output},
    peripherals::PIO0,
    pio_programs::ws2812::PioWs2812,
};
use smart_leds::RGB8;

impl InputLine for Input<'_> {
    fn is_high(&mut self) -> bool {
        Input::is_high(self)
    }
}

impl StatusIndicator for Output<'_> {
    fn set(&mut self, on: bool) {
        self.set_level(Level::from(on));
    }
}

type Ws2812 = PioWs2812<'static, PIO0, 0, LED_COUNT>;

/// WS2812 strip on a PIO state machine. [LightingOutput::commit] only prepares a frame; the async
/// [LedStrip::flush] is what puts it on the wire.
pub struct LedStrip {
    driver: Ws2812,
    staged: [Rgb; LED_COUNT],
    pending: Option<[RGB8; LED_COUNT]>,
    shown: Option<[RGB8; LED_COUNT]>,
}

impl LedStrip {
    pub fn new(driver: Ws2812) -> Self {
        LedStrip {
            driver,
            staged: [(0, 0, 0); LED_COUNT],
            pending: None,
            shown: None,
        }
    }

    /// Write the last committed frame, unless the strip already shows it
    pub async fn flush(&mut self) {
        let Some(frame) = self.pending.take() else { return };
        if self.shown == Some(frame) {
            return;
        }
        self.driver.write(&frame).await;
        self.shown = Some(frame);
    }
}

impl LightingOutput for LedStrip {
    fn set_channel(&mut self, index: usize, color: Rgb) {
        if let Some(slot) = self.staged.get_mut(index) {
            *slot = color;
        }
    }

    fn commit(&mut self, brightness: Brightness) {
        self.pending = Some(self.staged.map(|color| {
            let (r, g, b) = brightness.scale(color);
            RGB8::new(r, g, b)
        }));
    }
}
