//! Library build of the hardware-independent modules, so their unit tests run on the host without
//! pulling in embassy-rp. main.rs declares the same modules again alongside the board and USB code.
//! See the `run-tests` script in the project root.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

#[allow(dead_code, unused_imports)]
mod dispatch;
#[allow(dead_code, unused_imports)]
mod hid;
#[allow(dead_code, unused_imports)]
mod keymap;
#[allow(dead_code, unused_imports)]
mod layer;
#[allow(dead_code, unused_imports)]
mod lighting;
#[allow(dead_code, unused_imports)]
mod macropad;
#[allow(dead_code, unused_imports)]
mod rmk;
#[allow(dead_code, unused_imports)]
mod scan;
