//! Carries out an [Action] when its button is pressed or released: sends keys and media controls
//! through the HID capabilities, moves between layers and adjusts the lighting.

use crate::hid::{ChordOverflow, KeyEmulation, MediaControl};
use crate::keymap::{Action, LayerMode};
use crate::layer::LayerState;
use crate::lighting::Lighting;

/// Mutable view of everything an [Action] may change, for one dispatch.
pub struct Dispatcher<'a> {
    pub layer_count: usize,
    pub layers: &'a mut LayerState,
    pub lighting: &'a mut Lighting,
}

impl Dispatcher<'_> {
    pub fn press<H: KeyEmulation + MediaControl>(&mut self, action: Action, hid: &mut H) {
        debug!("Pressed:  {:?}", action);
        match action {
            Action::None => {}
            Action::Key(chord) => match KeyEmulation::press(hid, chord) {
                Ok(()) => {}
                // Too many keys down at once, drop this press and carry on
                Err(ChordOverflow { held, requested }) => {
                    warn!("chord of {} keys dropped, {} already held", requested, held);
                }
            },
            Action::Media(control) => MediaControl::press(hid, control),
            Action::Layer(_, target) => {
                if let Err(e) = self.layers.change(target, self.layer_count) {
                    warn!("layer change rejected: {:?}", e);
                }
            }
            Action::Lighting(op) => self.lighting.apply(op),
        }
    }

    pub fn release<H: KeyEmulation + MediaControl>(&mut self, action: Action, hid: &mut H) {
        debug!("Released: {:?}", action);
        match action {
            Action::Key(chord) => KeyEmulation::release(hid, chord),
            Action::Media(_) => MediaControl::release(hid),
            Action::Layer(LayerMode::Peek, _) => self.layers.restore(),
            Action::Layer(LayerMode::Switch, _) | Action::Lighting(_) | Action::None => {}
        }
    }
}
