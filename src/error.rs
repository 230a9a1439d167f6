//! The error type shared by every fallible operation of the driver.

use core::fmt;

/// Errors returned by the display buffer, the control operations and the device shim. `E` is the
/// error type of the underlying `DisplayInterface`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A write started at or past the last writable offset. Nothing was stored and nothing was
    /// sent to the display.
    OutOfSpace,
    /// The transport failed to deliver a transaction. The in-memory buffer may already hold the
    /// data that the display is missing; `Display::resync` brings them back in line.
    Bus(E),
    /// A raw cursor mode selector did not name a known mode.
    UnsupportedMode,
    /// A raw seek origin did not name a known origin.
    InvalidSeekOrigin,
    /// A command argument was outside the range the controller can encode.
    OutOfRange,
    /// A raw control request selector is not handled by this driver.
    UnsupportedControl,
}

impl<E> Error<E> {
    /// True for failures of the transport, as opposed to requests rejected before any bus
    /// activity.
    pub fn is_bus(&self) -> bool {
        match self {
            Error::Bus(_) => true,
            _ => false,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OutOfSpace => f.write_str("no space left in display buffer"),
            Error::Bus(e) => write!(f, "bus transfer failed: {:?}", e),
            Error::UnsupportedMode => f.write_str("unsupported cursor mode"),
            Error::InvalidSeekOrigin => f.write_str("invalid seek origin"),
            Error::OutOfRange => f.write_str("command argument out of range"),
            Error::UnsupportedControl => f.write_str("unsupported control request"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_bus_error() {
        let e: Error<u8> = Error::Bus(7);
        assert_eq!(e.to_string(), "bus transfer failed: 7");
        assert!(e.is_bus());
        assert!(!Error::<u8>::OutOfSpace.is_bus());
    }
}
