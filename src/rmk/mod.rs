//! Keycode definitions taken from the [rmk](https://github.com/HaoboGu/rmk/) project, trimmed to
//! the HID keyboard page and the consumer-control codes a macro pad can send.

pub mod keycode;
