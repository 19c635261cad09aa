//! LED strip brightness and the per-layer colour palettes.

use crate::keymap::LightingOp;

/// How many LEDs are on the strip
pub const LED_COUNT: usize = 4;

/// Red, green, blue
pub type Rgb = (u8, u8, u8);
pub type Palette = [Rgb; LED_COUNT];

/// Colours while the default layer is active
pub const DEFAULT_PALETTE: Palette = [(255, 20, 32), (125, 255, 32), (50, 32, 255), (255, 10, 255)];
/// Colours for every other layer
pub const LAYER_PALETTE: Palette = [(200, 20, 180), (40, 110, 195), (20, 120, 200), (220, 20, 160)];

pub const fn palette_for(layer: u8) -> &'static Palette {
    if layer == crate::layer::DEFAULT_LAYER {
        &DEFAULT_PALETTE
    } else {
        &LAYER_PALETTE
    }
}

/// Strip brightness, in whole percent so that stepping up and down always lands on the same values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness(u8);

impl Brightness {
    pub const OFF: Brightness = Brightness(0);
    pub const HALF: Brightness = Brightness(50);
    pub const FULL: Brightness = Brightness(100);
    const STEP: u8 = 10;

    /// `percent` is clamped to 100
    pub const fn from_percent(percent: u8) -> Self {
        if percent > 100 {
            Brightness(100)
        } else {
            Brightness(percent)
        }
    }

    /// Brightness on the 0.0 to 1.0 scale
    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / 100.0
    }

    pub const fn is_off(self) -> bool {
        self.0 == 0
    }

    pub const fn step_up(self) -> Self {
        Brightness::from_percent(self.0.saturating_add(Self::STEP))
    }

    pub const fn step_down(self) -> Self {
        Brightness(self.0.saturating_sub(Self::STEP))
    }

    /// Dim a colour to this brightness
    pub const fn scale(self, (r, g, b): Rgb) -> Rgb {
        const fn dim(channel: u8, percent: u8) -> u8 {
            (channel as u16 * percent as u16 / 100) as u8
        }
        (dim(r, self.0), dim(g, self.0), dim(b, self.0))
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Brightness::HALF
    }
}

/// The LED strip, as seen by the main loop
pub trait LightingOutput {
    /// Stage a colour for LED `index`; nothing changes on the strip until [LightingOutput::commit]
    fn set_channel(&mut self, index: usize, color: Rgb);
    /// Push every staged colour out at `brightness`
    fn commit(&mut self, brightness: Brightness);
}

/// Brightness state shared by every [LightingOp]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lighting {
    brightness: Brightness,
}

impl Lighting {
    pub const fn new(brightness: Brightness) -> Self {
        Lighting { brightness }
    }

    pub const fn brightness(&self) -> Brightness {
        self.brightness
    }

    pub fn apply(&mut self, op: LightingOp) {
        self.brightness = match op {
            LightingOp::Toggle if self.brightness.is_off() => Brightness::HALF,
            LightingOp::Toggle => Brightness::OFF,
            LightingOp::IncreaseBrightness => self.brightness.step_up(),
            LightingOp::DecreaseBrightness => self.brightness.step_down(),
        };
    }

    /// Stage `layer`'s palette on `output` and push it
    pub fn show<O: LightingOutput>(&self, layer: u8, output: &mut O) {
        for (index, &color) in palette_for(layer).iter().enumerate() {
            output.set_channel(index, color);
        }
        output.commit(self.brightness);
    }
}
