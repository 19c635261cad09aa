//! Firmware for a twelve-button USB macro pad based on the Raspberry Pi Pico, using the
//! [embassy_rp] framework.

#![no_main]
#![no_std]

#[macro_use]
mod fmt;

mod board;
mod dispatch;
mod hid;
mod keymap;
mod layer;
mod lighting;
mod macropad;
mod scan;
mod usb;

/// Useful constants (such as keycodes) extracted from the otherwise-unrelated [rmk](https://github.com/HaoboGu/rmk/) project.
mod rmk;

use embassy_executor::Spawner;
use embassy_rp::{
    bind_interrupts,
    gpio::{Input, Level, Output, Pull},
    peripherals::PIO0,
    pio::{InterruptHandler as PioInterruptHandler, Pio},
    pio_programs::ws2812::{PioWs2812, PioWs2812Program},
};
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};

#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_reset as _;

macro_rules! button_pins {
    ($dev:ident; $($pin:ident),*) => {[ $(Input::new($dev.$pin, Pull::Up)),* ]}
}

/// Channel for [macropad] to send HID reports to [usb], and ultimately to the host.
pub(crate) static REPORTS_CHANNEL: Channel<RawMutex, hid::Report, { hid::OUTBOX_SIZE }> = Channel::new();
type RawMutex = embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;

type Pad = macropad::Macropad<Input<'static>, { keymap::BUTTONS }>;

bind_interrupts!(struct PioIrqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("macro pad starting");

    let status_led = Output::new(p.PIN_25, Level::Low);

    let buttons: [Input; keymap::BUTTONS] = button_pins!(p;
        PIN_2, PIN_3, PIN_4, PIN_5, PIN_6, PIN_7, PIN_8, PIN_9, PIN_10, PIN_11, PIN_12, PIN_13
    );

    let Pio { mut common, sm0, .. } = Pio::new(p.PIO0, PioIrqs);
    let program = PioWs2812Program::new(&mut common);
    let strip = board::LedStrip::new(PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_28, &program));

    let usb_driver = embassy_rp::usb::Driver::new(p.USB, usb::Irqs);
    let (usb_device, keyboard, media) = usb::get_device(usb_driver);
    spawner.spawn(usb::run(usb_device, keyboard, media)).expect("spawn usb");

    let pad = macropad::Macropad::new(
        keymap::KEYMAP,
        scan::Buttons::new(buttons),
        lighting::Lighting::default(),
    );
    // Runs on the main task so the PIO program stays loaded
    run_macropad(pad, status_led, strip).await
}

async fn run_macropad(mut pad: Pad, mut status_led: Output<'static>, mut strip: board::LedStrip) -> ! {
    let mut hid = hid::HidReports::new();
    loop {
        pad.tick(&mut hid, &mut status_led, &mut strip);
        for report in hid.drain() {
            if usb::is_configured() {
                REPORTS_CHANNEL.send(report).await;
            }
        }
        strip.flush().await;
        Timer::after(Duration::from_millis(scan::DEBOUNCE_INTERVAL_MS)).await;
    }
}
