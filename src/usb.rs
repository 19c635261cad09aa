//! Implements the USB device and the task that carries HID [KeyboardReport]s and consumer-control
//! [MediaKeyboardReport]s to the host.
//! Mostly lifted from [embassy_usb] examples.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::hid::Report;
use crate::REPORTS_CHANNEL;

use embassy_futures::join::join;
use embassy_rp::{
    peripherals::USB,
    usb::{Driver, InterruptHandler},
    bind_interrupts,
};
use embassy_usb::{
    class::hid::{Config as HidConfig, HidReaderWriter, HidWriter, ReportId, RequestHandler, State as HidState},
    control::OutResponse,
    Builder, Handler, UsbDevice,
};
use usbd_hid::descriptor::{KeyboardReport, MediaKeyboardReport, SerializedDescriptor};

use static_cell::StaticCell;

type MyDriver = Driver<'static, USB>;
type MyUsbDevice = UsbDevice<'static, MyDriver>;
type MyHidReaderWriter = HidReaderWriter<'static, MyDriver, 1, 8>;
type MyMediaWriter = HidWriter<'static, MyDriver, 8>;

bind_interrupts!(pub(crate) struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

/// Set while the host has the device configured and is listening for reports
static CONFIGURED: AtomicBool = AtomicBool::new(false);

pub fn is_configured() -> bool {
    CONFIGURED.load(Ordering::Relaxed)
}

pub fn get_device(driver: MyDriver) -> (MyUsbDevice, MyHidReaderWriter, MyMediaWriter) {
    let mut config = embassy_usb::Config::new(0xfeed, 0x3062);
    config.manufacturer = Some("Makro");
    config.product = Some("Pico Macro Pad");
    config.serial_number = Some("001");
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    static DEVICE_HANDLER: StaticCell<MyDeviceHandler> = StaticCell::new();

    // Create embassy-usb DeviceBuilder using the driver and config.
    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
    let mut builder = Builder::new(
        driver,
        config,
        &mut CONFIG_DESC.init([0; 256])[..],
        &mut BOS_DESC.init([0; 256])[..],
        &mut [], // no msos descriptors
        &mut CONTROL_BUF.init([0; 128])[..],
    );

    builder.handler(DEVICE_HANDLER.init(MyDeviceHandler));

    let keyboard = {
        static STATE: StaticCell<HidState> = StaticCell::new();
        let config = HidConfig {
            report_descriptor: KeyboardReport::desc(),
            request_handler: None,
            poll_ms: 10,
            max_packet_size: 64,
        };
        HidReaderWriter::<_, 1, 8>::new(&mut builder, STATE.init(HidState::new()), config)
    };

    let media = {
        static STATE: StaticCell<HidState> = StaticCell::new();
        let config = HidConfig {
            report_descriptor: MediaKeyboardReport::desc(),
            request_handler: None,
            poll_ms: 10,
            max_packet_size: 8,
        };
        HidWriter::<_, 8>::new(&mut builder, STATE.init(HidState::new()), config)
    };

    (builder.build(), keyboard, media)
}

#[embassy_executor::task]
pub async fn run(mut usb: MyUsbDevice, keyboard: MyHidReaderWriter, mut media: MyMediaWriter) {
    // Run the USB device.
    let usb_fut = usb.run();

    let (reader, mut writer) = keyboard.split();

    // Forward every report in the order the macro pad produced it
    let in_fut = async {
        loop {
            let result = match REPORTS_CHANNEL.receive().await {
                Report::Keyboard(report) => writer.write_serialize(&report).await,
                Report::Media(report) => media.write_serialize(&report).await,
            };
            if let Err(e) = result {
                warn!("Failed to send report: {:?}", e);
            }
        }
    };

    let out_fut = async {
        static REQUEST_HANDLER: StaticCell<MyRequestHandler> = StaticCell::new();
        reader.run(false, REQUEST_HANDLER.init(MyRequestHandler {})).await;
    };

    // Run everything concurrently.
    join(usb_fut, join(in_fut, out_fut)).await;
}

/// Accepts the host's keyboard LED reports; the macro pad has no lock LEDs to show them on.
struct MyRequestHandler;

impl RequestHandler for MyRequestHandler {
    fn get_report(&mut self, id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        debug!("Get report for {:?}", id);
        None
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        debug!("Set report for {:?}: {=[u8]}", id, data);
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, id: Option<ReportId>, dur: u32) {
        debug!("Set idle rate for {:?} to {:?}", id, dur);
    }

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

struct MyDeviceHandler;

impl Handler for MyDeviceHandler {
    fn enabled(&mut self, enabled: bool) {
        CONFIGURED.store(false, Ordering::Relaxed);
        if enabled {
            info!("Device enabled");
        } else {
            info!("Device disabled");
        }
    }

    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Relaxed);
        info!("Bus reset, the Vbus current limit is 100mA");
    }

    fn addressed(&mut self, addr: u8) {
        CONFIGURED.store(false, Ordering::Relaxed);
        info!("USB address set to: {}", addr);
    }

    fn configured(&mut self, configured: bool) {
        CONFIGURED.store(configured, Ordering::Relaxed);
        if configured {
            info!("Device configured, it may now draw up to the configured current limit from Vbus.")
        } else {
            info!("Device is no longer configured, the Vbus current limit is 100mA.");
        }
    }
}
