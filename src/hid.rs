//! Keyboard and consumer-control report state, and the capabilities [crate::dispatch] drives it
//! through. Every change queues a [Report] which the USB task sends on to the host.

use crate::keymap::CHORD_LIMIT;
use crate::rmk::keycode::KeyCode;
use heapless::Vec;
use usbd_hid::descriptor::{KeyboardReport, MediaKeyboardReport};

/// Most reports one tick can queue: one edge per button, plus headroom for a press that also
/// clears the media key.
pub const OUTBOX_SIZE: usize = 16;

/// A press asked for more keys than the report has free slots for. Nothing was pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChordOverflow {
    pub held: usize,
    pub requested: usize,
}

/// Keyboard emulation: press and release chords of [KeyCode]s
pub trait KeyEmulation {
    /// Hold every key of `chord` at once, or none of them if they don't all fit.
    fn press(&mut self, chord: &[KeyCode]) -> Result<(), ChordOverflow>;
    fn release(&mut self, chord: &[KeyCode]);
}

/// Consumer-control emulation. Only one control is ever held.
pub trait MediaControl {
    fn press(&mut self, control: KeyCode);
    /// Let go of whichever control is held
    fn release(&mut self);
}

/// A report ready to go to the host
pub enum Report {
    Keyboard(KeyboardReport),
    Media(MediaKeyboardReport),
}

/// The currently-held keys and media control, mirrored as HID reports.
pub struct HidReports {
    modifier: u8,
    keycodes: [u8; CHORD_LIMIT],
    media: u16,
    outbox: Vec<Report, OUTBOX_SIZE>,
}

impl Default for HidReports {
    fn default() -> Self {
        Self::new()
    }
}

impl HidReports {
    pub const fn new() -> Self {
        HidReports {
            modifier: 0,
            keycodes: [0; CHORD_LIMIT],
            media: 0,
            outbox: Vec::new(),
        }
    }

    pub fn keyboard_report(&self) -> KeyboardReport {
        KeyboardReport {
            modifier: self.modifier,
            reserved: 0,
            leds: 0,
            keycodes: self.keycodes,
        }
    }

    pub fn media_report(&self) -> MediaKeyboardReport {
        MediaKeyboardReport { usage_id: self.media }
    }

    /// Hand over everything queued since the last drain, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = Report> {
        core::mem::take(&mut self.outbox).into_iter()
    }

    fn held_count(&self) -> usize {
        self.keycodes.iter().filter(|&&code| code != 0).count()
    }

    fn is_held(&self, code: u8) -> bool {
        self.keycodes.contains(&code)
    }

    fn queue(&mut self, report: Report) {
        if self.outbox.push(report).is_err() {
            warn!("HID outbox full, dropping report");
        }
    }

    fn queue_keyboard(&mut self) {
        let report = self.keyboard_report();
        self.queue(Report::Keyboard(report));
    }
}

impl KeyEmulation for HidReports {
    fn press(&mut self, chord: &[KeyCode]) -> Result<(), ChordOverflow> {
        let held = self.held_count();
        let needed = chord
            .iter()
            .enumerate()
            .filter(|(i, code)| {
                !code.is_modifier()
                    && !self.is_held(**code as u8)
                    && !chord[..*i].contains(*code)
            })
            .count();
        if chord.len() > CHORD_LIMIT || held + needed > CHORD_LIMIT {
            return Err(ChordOverflow { held, requested: chord.len() });
        }

        for &code in chord {
            if code.is_modifier() {
                self.modifier |= code.as_modifier_bit();
            } else if !self.is_held(code as u8) {
                if let Some(slot) = self.keycodes.iter_mut().find(|slot| **slot == 0) {
                    *slot = code as u8;
                }
            }
        }
        self.queue_keyboard();
        Ok(())
    }

    fn release(&mut self, chord: &[KeyCode]) {
        for &code in chord {
            if code.is_modifier() {
                self.modifier &= !code.as_modifier_bit();
            } else {
                for slot in self.keycodes.iter_mut().filter(|slot| **slot == code as u8) {
                    *slot = 0;
                }
            }
        }
        self.queue_keyboard();
    }
}

impl MediaControl for HidReports {
    fn press(&mut self, control: KeyCode) {
        self.media = control.as_consumer_control_usage_id() as u16;
        self.queue(Report::Media(self.media_report()));
    }

    fn release(&mut self) {
        self.media = 0;
        self.queue(Report::Media(self.media_report()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rmk::keycode::KeyCode::*;
    use usbd_hid::descriptor::MediaKey;

    #[test]
    fn chord_fills_slots_and_modifier_byte() {
        let mut hid = HidReports::new();
        KeyEmulation::press(&mut hid, &[LAlt, F10]).unwrap();
        let report = hid.keyboard_report();
        assert_eq!(report.modifier, 0x04);
        assert_eq!(report.keycodes, [F10 as u8, 0, 0, 0, 0, 0]);

        KeyEmulation::release(&mut hid, &[LAlt, F10]);
        let report = hid.keyboard_report();
        assert_eq!(report.modifier, 0);
        assert_eq!(report.keycodes, [0; 6]);
        assert_eq!(hid.drain().count(), 2);
    }

    #[test]
    fn seven_keys_are_rejected_without_touching_the_report() {
        let mut hid = HidReports::new();
        let result = KeyEmulation::press(&mut hid, &[A, B, C, D, E, F, G]);
        assert_eq!(result, Err(ChordOverflow { held: 0, requested: 7 }));
        assert_eq!(hid.keyboard_report().keycodes, [0; 6]);
        assert_eq!(hid.drain().count(), 0);
    }

    #[test]
    fn overlapping_chords_overflow_atomically() {
        let mut hid = HidReports::new();
        KeyEmulation::press(&mut hid, &[A, B, C, D]).unwrap();
        assert!(KeyEmulation::press(&mut hid, &[LCtrl, E, F, G]).is_err());
        let report = hid.keyboard_report();
        assert_eq!(report.modifier, 0);
        assert_eq!(report.keycodes, [A as u8, B as u8, C as u8, D as u8, 0, 0]);

        // Modifiers and keys already down don't need a slot
        KeyEmulation::press(&mut hid, &[LShift, A, E, F]).unwrap();
        assert_eq!(hid.keyboard_report().modifier, 0x02);
        assert_eq!(hid.keyboard_report().keycodes, [A as u8, B as u8, C as u8, D as u8, E as u8, F as u8]);
    }

    #[test]
    fn media_release_clears_whatever_is_held() {
        let mut hid = HidReports::new();
        // usage_id sits in a packed struct, so copy it out before comparing
        MediaControl::press(&mut hid, AudioVolUp);
        let usage = hid.media_report().usage_id;
        assert_eq!(usage, MediaKey::VolumeIncrement as u16);
        MediaControl::press(&mut hid, AudioMute);
        let usage = hid.media_report().usage_id;
        assert_eq!(usage, MediaKey::Mute as u16);
        MediaControl::release(&mut hid);
        let usage = hid.media_report().usage_id;
        assert_eq!(usage, 0);

        let queued: std::vec::Vec<Report> = hid.drain().collect();
        assert_eq!(queued.len(), 3);
        assert!(queued.iter().all(|r| matches!(r, Report::Media(_))));
    }
}
