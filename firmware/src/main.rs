//! # Watchdog supervisor on a Raspberry Pi Pico
//!
//! Boots the supervisor on an RP2040. After a power-on or software reset the
//! watchdog is started with a 2 s timeout and SysTick feeds it once per
//! second, toggling the LED on GP25 with every feed. The feed budget runs out
//! after ten feeds, the watchdog expires, and the next boot sees a watchdog
//! reset: the LED then blinks fast, forever, and nothing is fed.
//!
//! It may need to be adapted to your particular board layout and/or pin
//! assignment.

#![no_std]
#![no_main]

use cortex_m_rt::{entry, exception};
use embedded_alloc::Heap;
use panic_halt as _;

use rp2040_hal as hal;

use hal::clocks::Clock;
use hal::fugit::MicrosDurationU32;
use hal::gpio;
use hal::pac;

use wdt_hal::cortex_m_impl::{AsmDelay, SysTick as SysTickTimer, SysTickSource};
use wdt_hal::prelude::*;
use wdt_hal::slot::{dispatch, empty_slot};
use wdt_supervisor::{
    BootOutcome, FeedScheduler, FeedSchedulerState, Supervisor, SupervisorConfig, SupervisorParts,
    halt,
};

#[global_allocator]
static ALLOCATOR: Heap = Heap::empty();

/// The linker will place this boot block at the start of our program image. We
/// need this to help the ROM bootloader get our code up and running.
#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

/// External high-speed crystal on the Raspberry Pi Pico board is 12 MHz.
const XTAL_FREQ_HZ: u32 = 12_000_000u32;

/// Watchdog timeout. One feed per second keeps it comfortably alive.
const WATCHDOG_TIMEOUT: MicrosDurationU32 = MicrosDurationU32::from_ticks(2_000_000);

type LedPin = gpio::Pin<gpio::bank0::Gpio25, gpio::FunctionSioOutput, gpio::PullDown>;

type Handler = FeedScheduler<'static, PicoWatchdog, PinIndicator<LedPin>>;

static STATE: FeedSchedulerState = FeedSchedulerState::new();

/// Filled in by `boot` in normal mode, drained by the SysTick exception.
static TICK: TickSlot<Handler> = empty_slot();

/// Cause latched in the WATCHDOG `REASON` register.
///
/// The register is rewritten by hardware on every reset, so clearing only
/// forgets the copy taken at start-up.
struct PicoResetCause {
    latched: ResetCause,
}

impl PicoResetCause {
    fn read_from(watchdog: &pac::WATCHDOG) -> Self {
        let reason = watchdog.reason().read();
        let latched = if reason.timer().bit_is_set() {
            ResetCause::WATCHDOG
        } else if reason.force().bit_is_set() {
            ResetCause::SOFTWARE
        } else {
            ResetCause::POWER_ON
        };
        Self { latched }
    }
}

impl ResetCauseRegister for PicoResetCause {
    fn read(&self) -> ResetCause {
        self.latched
    }

    fn clear(&mut self) {
        self.latched = ResetCause::empty();
    }
}

/// The RP2040 watchdog. Not windowed: any feed before the timeout counts.
struct PicoWatchdog {
    inner: hal::Watchdog,
    timeout: MicrosDurationU32,
}

impl WatchdogDriver for PicoWatchdog {
    fn start(&mut self) {
        self.inner.pause_on_debug(true);
        self.inner.start(self.timeout);
    }

    fn service(&mut self) {
        self.inner.feed();
    }

    fn window(&self) -> Option<WatchdogWindow> {
        WatchdogWindow::new(0, self.timeout.to_millis())
    }
}

/// Clocks are brought up before the supervisor exists; this reports how
/// that went.
struct PicoBoard {
    clocks: Result<(), BringUpError>,
}

impl BoardSupport for PicoBoard {
    fn init(&mut self) -> Result<(), BringUpError> {
        self.clocks
    }
}

/// Entry point to our bare-metal application.
#[entry]
fn main() -> ! {
    {
        use core::mem::MaybeUninit;
        const HEAP_SIZE: usize = 1024;
        static mut HEAP: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
        unsafe { ALLOCATOR.init(core::ptr::addr_of_mut!(HEAP) as usize, HEAP_SIZE) }
    }

    let (Some(mut pac), Some(core)) = (pac::Peripherals::take(), pac::CorePeripherals::take())
    else {
        halt(BringUpError::Peripheral("pac").into());
    };

    // Must be read before the HAL takes the watchdog over.
    let reset_cause = PicoResetCause::read_from(&pac.WATCHDOG);
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    let (clocks, core_clock_hz) = match hal::clocks::init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    ) {
        Ok(clocks) => (Ok(()), clocks.system_clock.freq().to_Hz()),
        Err(_) => (Err(BringUpError::Clock), XTAL_FREQ_HZ),
    };

    let sio = hal::Sio::new(pac.SIO);
    let pins = gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );
    let led: LedPin = pins.gpio25.into_push_pull_output();

    let config = match SupervisorConfig::builder()
        .core_clock_hz(core_clock_hz)
        .build()
    {
        Ok(config) => config,
        Err(e) => halt(e),
    };

    let parts = SupervisorParts {
        reset_cause,
        watchdog: PicoWatchdog {
            inner: watchdog,
            timeout: WATCHDOG_TIMEOUT,
        },
        indicator: PinIndicator::new(led),
        ticks: SysTickSource::new(SysTickTimer::new(core.SYST), &TICK),
        delay: AsmDelay::new(core_clock_hz),
    };

    let supervisor = match Supervisor::new(config, &STATE, parts) {
        Ok(supervisor) => supervisor,
        Err(e) => halt(e),
    };

    match supervisor.boot(&mut PicoBoard { clocks }) {
        Ok(BootOutcome::Diagnostic(diagnostic)) => diagnostic.run(),
        Ok(BootOutcome::Normal(normal)) => normal.idle(),
        Err(e) => halt(e),
    }
}

#[exception]
fn SysTick() {
    dispatch(&TICK);
}

// End of file
