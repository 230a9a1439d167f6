//! Defines the settings applied to the display at the end of `Display::init`.

use crate::command::consts::*;
use crate::command::*;
use crate::error::Error;
use crate::interface;

/// A configuration for the display. Builder methods offer a declarative way to either send a
/// setting at init time, or to leave it at the state the power-on sequence puts it in.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    contrast: u8,
    cursor_mode_cmd: Option<Command>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Create a new configuration. Contrast is always applied after power-on, so it defaults to
    /// mid-scale (`DEFAULT_CONTRAST`); the cursor stays off unless configured.
    pub fn new() -> Self {
        Config {
            contrast: DEFAULT_CONTRAST,
            cursor_mode_cmd: None,
        }
    }

    /// Extend this `Config` to apply a different contrast. Range is 0-63; anything larger makes
    /// `Display::init` fail with `Error::OutOfRange` before the contrast is sent.
    pub fn contrast(self, contrast: u8) -> Self {
        Self { contrast, ..self }
    }

    /// Extend this `Config` to explicitly configure the cursor. See `CursorMode`.
    pub fn cursor_mode(self, mode: CursorMode) -> Self {
        Self {
            cursor_mode_cmd: Some(Command::SetDisplayControl(true, mode)),
            ..self
        }
    }

    /// Transmit commands to the display at `iface` necessary to put that display into the
    /// configuration encoded in `self`.
    pub(crate) fn send<DI>(&self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: interface::DisplayInterface,
    {
        send_contrast(iface, self.contrast)?;
        self.cursor_mode_cmd.map_or(Ok(()), |c| c.send(iface))
    }
}

/// Program the contrast as two command transactions, low bits first.
pub(crate) fn send_contrast<DI>(iface: &mut DI, contrast: u8) -> Result<(), Error<DI::Error>>
where
    DI: interface::DisplayInterface,
{
    let [low, high] = Command::contrast(contrast).ok_or(Error::OutOfRange)?;
    low.send(iface)?;
    high.send(iface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::{Sent, TestSpyInterface};

    #[test]
    fn defaults() {
        let di = TestSpyInterface::new();
        Config::new().send(&mut di.split()).unwrap();
        di.check_multi(sends!(cmd [0x70], cmd [0x5E]));
    }

    #[test]
    fn contrast_and_cursor() {
        let di = TestSpyInterface::new();
        Config::new()
            .contrast(63)
            .cursor_mode(CursorMode::Blinking)
            .send(&mut di.split())
            .unwrap();
        di.check_multi(sends!(cmd [0x7F], cmd [0x5F], cmd [0x0F]));
    }

    #[test]
    fn contrast_out_of_range() {
        let di = TestSpyInterface::new();
        assert_eq!(
            Config::new().contrast(64).send(&mut di.split()),
            Err(Error::OutOfRange)
        );
        di.check_multi(sends!());
    }
}
