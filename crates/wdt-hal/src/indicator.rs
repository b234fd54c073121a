//! Binary diagnostic indicator.

use core::convert::Infallible;

use embedded_hal::digital::StatefulOutputPin;

/// A binary diagnostic output, usually the user LED.
///
/// Toggling cannot fail and returns nothing; the indicator holds no state
/// beyond its output level.
pub trait Indicator {
    /// Flip the output level.
    fn toggle(&mut self);
}

impl<I: Indicator + ?Sized> Indicator for &mut I {
    fn toggle(&mut self) {
        (**self).toggle();
    }
}

/// [`Indicator`] over any infallible `embedded-hal` stateful output pin.
///
/// ```rust,ignore
/// let led = PinIndicator::new(pins.gpio25.into_push_pull_output());
/// ```
#[derive(Debug)]
pub struct PinIndicator<P> {
    pin: P,
}

impl<P> PinIndicator<P> {
    /// Wrap an output pin.
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> Indicator for PinIndicator<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    fn toggle(&mut self) {
        if let Err(never) = self.pin.toggle() {
            match never {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorType, OutputPin};

    #[derive(Debug, Default)]
    struct FakePin {
        high: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    impl StatefulOutputPin for FakePin {
        fn is_set_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }

        fn is_set_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    #[test]
    fn test_pin_indicator_toggles_level() {
        let mut led = PinIndicator::new(FakePin::default());
        led.toggle();
        assert!(led.pin.high);
        led.toggle();
        assert!(!led.release().high);
    }
}
