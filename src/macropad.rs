//! Implements one polling tick of the macro pad: read every button, dispatch the [Action] bound
//! to any that changed, then refresh the status LED and the LED strip. Uses definitions from
//! [crate::keymap] and produces reports through [crate::hid].

use crate::dispatch::Dispatcher;
use crate::hid::{KeyEmulation, MediaControl};
use crate::keymap::{Action, Keymap};
use crate::layer::LayerState;
use crate::lighting::{Lighting, LightingOutput};
use crate::scan::{Buttons, Edge, InputLine};

/// The single indicator LED, lit while the default layer is active
pub trait StatusIndicator {
    fn set(&mut self, on: bool);
}

pub struct Macropad<L, const N: usize> {
    keymap: Keymap,
    buttons: Buttons<L, N>,
    layers: LayerState,
    lighting: Lighting,
}

impl<L: InputLine, const N: usize> Macropad<L, N> {
    pub fn new(keymap: Keymap, buttons: Buttons<L, N>, lighting: Lighting) -> Self {
        Macropad {
            keymap,
            buttons,
            layers: LayerState::new(),
            lighting,
        }
    }

    pub fn layers(&self) -> &LayerState {
        &self.layers
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    /// Run one tick. The caller sleeps for [crate::scan::DEBOUNCE_INTERVAL_MS] between ticks.
    pub fn tick<H, S, O>(&mut self, hid: &mut H, status: &mut S, leds: &mut O)
    where
        H: KeyEmulation + MediaControl,
        S: StatusIndicator,
        O: LightingOutput,
    {
        status.set(self.layers.is_default());

        for index in 0..N {
            // Every button's level is refreshed, even past the end of a short layer
            let Some(edge) = self.buttons.poll(index) else {
                continue;
            };
            // Looked up per button, so a layer change earlier in this tick already applies here
            let Some(action) = self.keymap.lookup(self.layers.active(), index) else {
                continue;
            };
            self.dispatch(edge, action, hid);
        }

        self.lighting.show(self.layers.active(), leds);
    }

    fn dispatch<H: KeyEmulation + MediaControl>(&mut self, edge: Edge, action: Action, hid: &mut H) {
        let mut dispatcher = Dispatcher {
            layer_count: self.keymap.layer_count(),
            layers: &mut self.layers,
            lighting: &mut self.lighting,
        };
        match edge {
            Edge::Pressed => dispatcher.press(action, hid),
            // Resolved against the layer active now, not the one the press went through
            Edge::Released => dispatcher.release(action, hid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::{Call, Recorder};
    use crate::hid::{HidReports, Report};
    use crate::keymap::{Layer, LayerMode, BUTTONS, KEYMAP, LAYER_DEFAULT, LAYER_MACRO};
    use crate::lighting::tests::FakeStrip;
    use crate::lighting::{Brightness, DEFAULT_PALETTE, LAYER_PALETTE};
    use crate::rmk::keycode::KeyCode::{AudioVolUp, LCtrl, A, B, F13, F20};
    use crate::scan::tests::FakeLine;

    #[derive(Default)]
    struct Led(Option<bool>);

    impl StatusIndicator for Led {
        fn set(&mut self, on: bool) {
            self.0 = Some(on);
        }
    }

    struct Rig<const BUTTON_COUNT: usize> {
        lines: [FakeLine; BUTTON_COUNT],
        pad: Macropad<FakeLine, BUTTON_COUNT>,
        hid: Recorder,
        led: Led,
        strip: FakeStrip,
    }

    impl<const BUTTON_COUNT: usize> Rig<BUTTON_COUNT> {
        fn new(keymap: Keymap) -> Self {
            let lines: [FakeLine; BUTTON_COUNT] = core::array::from_fn(|_| FakeLine::released());
            let pad = Macropad::new(keymap, Buttons::new(lines.clone()), Lighting::default());
            Rig { lines, pad, hid: Recorder::default(), led: Led::default(), strip: FakeStrip::default() }
        }

        fn tick(&mut self) {
            self.pad.tick(&mut self.hid, &mut self.led, &mut self.strip);
        }

        fn tap(&mut self, button: usize) {
            self.lines[button].press();
            self.tick();
            self.lines[button].release();
            self.tick();
        }
    }

    #[test]
    fn press_release_sends_chord_in_order() {
        static LAYER: [Action; 1] = [Action::Key(&[A, B])];
        static LAYERS: [Layer; 1] = [&LAYER];
        let mut rig = Rig::<1>::new(Keymap::new(&LAYERS));
        rig.tap(0);
        assert_eq!(rig.hid.calls, [Call::KeyPress(vec![A, B]), Call::KeyRelease(vec![A, B])]);
    }

    #[test]
    fn held_button_dispatches_once() {
        let mut rig = Rig::<BUTTONS>::new(KEYMAP);
        rig.lines[8].press();
        for _ in 0..5 {
            rig.tick();
        }
        assert_eq!(rig.hid.calls, [Call::KeyPress(vec![F20])]);
    }

    #[test]
    fn every_binding_releases_what_it_pressed() {
        for (layer, bindings) in [LAYER_DEFAULT, LAYER_MACRO].iter().enumerate() {
            for (button, action) in bindings.iter().enumerate() {
                let mut rig = Rig::<BUTTONS>::new(KEYMAP);
                if layer == 1 {
                    rig.tap(10);
                }
                if let Action::Layer(..) = action {
                    continue;
                }
                rig.hid.calls.clear();
                rig.tap(button);
                let expected = match action {
                    Action::Key(chord) => vec![Call::KeyPress(chord.to_vec()), Call::KeyRelease(chord.to_vec())],
                    Action::Media(control) => vec![Call::MediaPress(*control), Call::MediaRelease],
                    _ => vec![],
                };
                assert_eq!(rig.hid.calls, expected, "layer {} button {}", layer, button);
            }
        }
    }

    #[test]
    fn switch_button_moves_between_layers() {
        let mut rig = Rig::<BUTTONS>::new(KEYMAP);
        rig.tick();
        assert_eq!(rig.led.0, Some(true));

        rig.lines[10].press();
        rig.tick();
        assert_eq!(rig.pad.layers().active(), 1);
        assert_eq!(rig.strip.shown, Some((LAYER_PALETTE, Brightness::HALF)));

        // Releasing the switch looks up layer 1's binding, which is another switch: no effect
        rig.lines[10].release();
        rig.tick();
        assert_eq!(rig.pad.layers().active(), 1);
        assert_eq!(rig.led.0, Some(false));

        // Button 0 is brightness up here, not volume up
        rig.tap(0);
        assert!(rig.hid.calls.is_empty());
        assert_eq!(rig.pad.lighting().brightness(), Brightness::from_percent(60));

        rig.tap(7);
        assert_eq!(rig.hid.calls, [Call::KeyPress(vec![LCtrl, F13]), Call::KeyRelease(vec![LCtrl, F13])]);

        rig.lines[10].press();
        rig.tick();
        assert_eq!(rig.pad.layers().active(), 0);
        rig.tick();
        assert_eq!(rig.led.0, Some(true));
        // The brightness raised on layer 1 carries over to layer 0
        assert_eq!(rig.strip.shown, Some((DEFAULT_PALETTE, Brightness::from_percent(60))));
    }

    #[test]
    fn peek_lasts_while_held() {
        static BASE: [Action; 2] = [Action::Layer(LayerMode::Peek, 1), Action::Key(&[A])];
        static PEEKED: [Action; 2] = [Action::Layer(LayerMode::Peek, 1), Action::Key(&[B])];
        static LAYERS: [Layer; 2] = [&BASE, &PEEKED];
        let mut rig = Rig::<2>::new(Keymap::new(&LAYERS));

        rig.lines[0].press();
        rig.tick();
        assert_eq!(rig.pad.layers().active(), 1);
        rig.tap(1);
        rig.lines[0].release();
        rig.tick();
        assert_eq!(rig.pad.layers().active(), 0);
        rig.tap(1);

        assert_eq!(
            rig.hid.calls,
            [
                Call::KeyPress(vec![B]),
                Call::KeyRelease(vec![B]),
                Call::KeyPress(vec![A]),
                Call::KeyRelease(vec![A]),
            ]
        );
    }

    #[test]
    fn layer_change_applies_to_later_buttons_in_the_same_tick() {
        static BASE: [Action; 2] = [Action::Layer(LayerMode::Switch, 1), Action::Key(&[A])];
        static OTHER: [Action; 2] = [Action::None, Action::Key(&[B])];
        static LAYERS: [Layer; 2] = [&BASE, &OTHER];
        let mut rig = Rig::<2>::new(Keymap::new(&LAYERS));

        rig.lines[0].press();
        rig.lines[1].press();
        rig.tick();
        assert_eq!(rig.hid.calls, [Call::KeyPress(vec![B])]);
    }

    #[test]
    fn release_resolves_against_the_current_layer() {
        static BASE: [Action; 2] = [Action::Key(&[A]), Action::Layer(LayerMode::Switch, 1)];
        static OTHER: [Action; 2] = [Action::Key(&[B]), Action::Layer(LayerMode::Switch, 0)];
        static LAYERS: [Layer; 2] = [&BASE, &OTHER];
        let mut rig = Rig::<2>::new(Keymap::new(&LAYERS));

        rig.lines[0].press();
        rig.tick();
        rig.tap(1);
        rig.lines[0].release();
        rig.tick();
        assert_eq!(rig.hid.calls, [Call::KeyPress(vec![A]), Call::KeyRelease(vec![B])]);
    }

    #[test]
    fn short_layer_still_tracks_trailing_buttons() {
        static BASE: [Action; 2] = [Action::Layer(LayerMode::Switch, 1), Action::Key(&[A])];
        static SHORT: [Action; 1] = [Action::Layer(LayerMode::Switch, 0)];
        static LAYERS: [Layer; 2] = [&BASE, &SHORT];
        let mut rig = Rig::<2>::new(Keymap::new(&LAYERS));

        rig.lines[0].press();
        rig.tick();
        rig.lines[0].release();
        rig.tick();
        assert_eq!(rig.pad.layers().active(), 1);

        // Button 1 is inert on the short layer, but its level is still tracked
        rig.lines[1].press();
        rig.tick();
        assert!(rig.hid.calls.is_empty());

        rig.lines[0].press();
        rig.tick();
        assert_eq!(rig.pad.layers().active(), 0);

        // Still held from before, so no fresh press edge on the default layer
        rig.tick();
        assert!(rig.hid.calls.is_empty());
        rig.lines[1].release();
        rig.tick();
        assert_eq!(rig.hid.calls, [Call::KeyRelease(vec![A])]);
    }

    #[test]
    fn brightness_buttons_drive_the_strip() {
        let mut rig = Rig::<BUTTONS>::new(KEYMAP);
        rig.tap(10);
        for _ in 0..8 {
            rig.tap(0);
        }
        assert_eq!(rig.pad.lighting().brightness(), Brightness::FULL);
        assert_eq!(rig.strip.shown, Some((LAYER_PALETTE, Brightness::FULL)));

        rig.tap(2);
        assert_eq!(rig.pad.lighting().brightness(), Brightness::OFF);
        rig.tap(2);
        assert_eq!(rig.pad.lighting().brightness(), Brightness::HALF);
    }

    #[test]
    fn real_reports_for_a_media_tap() {
        let lines: [FakeLine; BUTTONS] = core::array::from_fn(|_| FakeLine::released());
        let mut pad = Macropad::new(KEYMAP, Buttons::new(lines.clone()), Lighting::default());
        let (mut hid, mut led, mut strip) = (HidReports::new(), Led::default(), FakeStrip::default());

        lines[0].press();
        pad.tick(&mut hid, &mut led, &mut strip);
        lines[0].release();
        pad.tick(&mut hid, &mut led, &mut strip);

        let usages: std::vec::Vec<u16> = hid
            .drain()
            .map(|report| match report {
                Report::Media(media) => media.usage_id,
                Report::Keyboard(_) => panic!("unexpected keyboard report"),
            })
            .collect();
        assert_eq!(usages, [AudioVolUp.as_consumer_control_usage_id() as u16, 0]);
    }
}
