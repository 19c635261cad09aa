//! Defines what each button does (an [Action]) and the layers of mapping from physical buttons to
//! these [Action]s.
//!
//! Intimately related to [crate::dispatch], which turns looked-up [Action]s into HID reports,
//! layer changes and lighting changes.

use crate::rmk::keycode::KeyCode;
use crate::rmk::keycode::KeyCode::*;

/// Most keys a single boot keyboard report can hold at once
pub const CHORD_LIMIT: usize = 6;

/// How many physical buttons there are
pub const BUTTONS: usize = 12;

/// Whether a layer change lasts only while its button is held
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerMode {
    /// Active while the button is held, the previous layer comes back on release
    Peek,
    /// Stays active until another layer change fires
    Switch,
}

/// Adjustments to the LED strip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightingOp {
    Toggle,
    IncreaseBrightness,
    DecreaseBrightness,
}

/// An Action which a button press should Do
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    #[default]
    None,
    /// Keys held together as one chord, modifiers included
    Key(&'static [KeyCode]),
    /// A consumer-page media control
    Media(KeyCode),
    Layer(LayerMode, u8),
    Lighting(LightingOp),
}

/// A row of [Action]s, one per button, in pin order. May be shorter than [BUTTONS].
pub type Layer = &'static [Action];

/// Ordered set of [Layer]s, fixed for the life of the firmware
#[derive(Clone, Copy, Debug)]
pub struct Keymap {
    layers: &'static [Layer],
}

impl Keymap {
    pub const fn new(layers: &'static [Layer]) -> Self {
        Keymap { layers }
    }

    pub const fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of bound buttons on `layer`, 0 for a layer that doesn't exist
    pub fn layer_len(&self, layer: u8) -> usize {
        self.layers.get(layer as usize).map_or(0, |l| l.len())
    }

    /// The [Action] bound to `button` on `layer`, or `None` past the end of a truncated layer
    pub fn lookup(&self, layer: u8, button: usize) -> Option<Action> {
        self.layers.get(layer as usize)?.get(button).copied()
    }
}

/// Translate a chord of [KeyCode]s into a valid [Action]. Every code must belong on the keyboard
/// page; media controls go through [media] instead.
pub const fn key(chord: &'static [KeyCode]) -> Action {
    assert!(!chord.is_empty(), "key() with empty chord");
    let mut i = 0;
    while i < chord.len() {
        assert!(chord[i].is_basic() || chord[i].is_modifier(), "key() with non-keyboard keycode");
        i += 1;
    }
    Action::Key(chord)
}

/// Translate a consumer [KeyCode] into a valid [Action]
const fn media(code: KeyCode) -> Action {
    assert!(code.is_consumer(), "media() with non-consumer keycode");
    Action::Media(code)
}

const fn switch(layer: u8) -> Action {
    Action::Layer(LayerMode::Switch, layer)
}

const fn light(op: LightingOp) -> Action {
    Action::Lighting(op)
}

/// Media controls and program hotkeys
pub const LAYER_DEFAULT: [Action; BUTTONS] = [
    media(AudioVolUp),
    media(AudioVolDown),
    media(AudioMute),
    key(&[LAlt, F10]), // shadowplay
    media(MediaNextTrack),
    media(MediaPlayPause),
    media(MediaPrevTrack),
    key(&[LGui, PrintScreen]),
    key(&[F20]),
    key(&[F21]),
    switch(1),
    key(&[F23]),
];

/// Lighting adjustment and more hotkeys for custom macros
pub const LAYER_MACRO: [Action; BUTTONS] = [
    light(LightingOp::IncreaseBrightness),
    light(LightingOp::DecreaseBrightness),
    light(LightingOp::Toggle),
    key(&[F16]),
    key(&[F17]),
    key(&[F18]),
    key(&[F19]),
    key(&[LCtrl, F13]),
    key(&[LCtrl, F14]),
    key(&[LCtrl, F15]),
    switch(0),
    key(&[LCtrl, F16]),
];

pub const KEYMAP: Keymap = Keymap::new(&[&LAYER_DEFAULT, &LAYER_MACRO]);
