//! The command set for the ST7032 controller on the AQM0802A.
//!
//! Note 1: The controller has two instruction tables, selected by the IS bit of function set.
//! Display control, clear, entry mode and DDRAM address commands exist in both. The oscillator,
//! contrast, power/icon and follower commands only exist in the extended table, which stays
//! selected once `Display::init` has run.
//!
//! Note 2: DDRAM is organised as two rows at non-adjacent addresses, 0x00 and 0x40. The module
//! shows eight cells of each row.

use crate::error::Error;
use crate::interface::DisplayInterface;

pub mod consts {
    //! Geometry, limits and timing of the module.

    pub const NUM_ROWS: usize = 2;
    pub const NUM_COLS: usize = 8;
    /// Size of the logical text buffer.
    pub const BUF_SIZE: usize = NUM_ROWS * NUM_COLS;
    /// Writes must start strictly before this offset.
    pub const WRITE_LIMIT: usize = BUF_SIZE - 1;
    /// Seeks are clamped to this offset.
    pub const POSITION_MAX: usize = BUF_SIZE - 1;
    /// First logical offset of the second row.
    pub const ROW_BOUNDARY: usize = NUM_COLS;

    /// DDRAM address of the first cell of each row. (Note 2)
    pub const ROW_DDRAM_BASE: [u8; NUM_ROWS] = [0x00, 0x40];

    pub const CONTRAST_MAX: u8 = 0x3F;
    /// Mid-scale contrast applied at the end of initialization.
    pub const DEFAULT_CONTRAST: u8 = 32;
    /// Contrast programmed by the power-on command group.
    pub const POWER_ON_CONTRAST: u8 = 40;

    /// Settle time after setting the DDRAM address.
    pub const ADDRESS_SETTLE_US: u16 = 27;
    /// Settle time after clearing the display.
    pub const CLEAR_SETTLE_MS: u16 = 2;
    /// Settle time after the power-on command group, while the booster and follower stabilise.
    pub const POWER_ON_SETTLE_MS: u16 = 250;
    /// Settle time after the display-on/clear/entry-mode group.
    pub const DISPLAY_ON_SETTLE_MS: u16 = 50;

    /// Most commands carried by one command transaction.
    pub const MAX_BATCH: usize = 6;
}

use self::consts::*;

/// The instruction table selected by function set. (Note 1)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InstructionTable {
    /// IS = 0: cursor/display shift and CGRAM address commands.
    Normal,
    /// IS = 1: oscillator, contrast, power/icon and follower commands.
    Extended,
}

/// How the cursor is shown at the DDRAM address pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CursorMode {
    /// No cursor.
    Off,
    /// An underline cursor.
    Solid,
    /// An underline cursor plus a blinking block.
    Blinking,
}

impl CursorMode {
    /// Decode a raw selector as handed over by a control request: 0 is `Off`, 1 is `Solid`, 2 is
    /// `Blinking`. Anything else is rejected with `Error::UnsupportedMode`.
    pub fn from_selector<E>(raw: u32) -> Result<Self, Error<E>> {
        match raw {
            0 => Ok(CursorMode::Off),
            1 => Ok(CursorMode::Solid),
            2 => Ok(CursorMode::Blinking),
            _ => Err(Error::UnsupportedMode),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Function set: 8-bit bus, two display lines, normal height font, and the instruction table
    /// that following commands are decoded with.
    FunctionSet(InstructionTable),
    /// Internal oscillator: bias selection (true for 1/4, false for 1/5) and frequency adjust.
    /// Frequency range is 0-7. Extended table only.
    SetOscillator(bool, u8),
    /// Contrast bits 3:0. Range is 0-15. Extended table only.
    SetContrastLow(u8),
    /// Icon display enable, booster enable and contrast bits 5:4. Contrast range is 0-3.
    /// Extended table only.
    SetPowerIconContrast(bool, bool, u8),
    /// Voltage follower enable and amplifier ratio. Ratio range is 0-7. Extended table only.
    SetFollower(bool, u8),
    /// Display on/off and the cursor shown at the address pointer.
    SetDisplayControl(bool, CursorMode),
    /// Fill DDRAM with spaces and return the address pointer to 0x00. Needs `CLEAR_SETTLE_MS`.
    ClearDisplay,
    /// Entry mode: address increment (true) or decrement, and whether the display shifts.
    SetEntryMode(bool, bool),
    /// Set the DDRAM address pointer. Only the cells the module shows are accepted: 0x00-0x07
    /// and 0x40-0x47. Needs `ADDRESS_SETTLE_US`.
    SetDdramAddress(u8),
}

pub enum BufCommand<'buf> {
    /// Write characters into DDRAM at the address pointer, which advances by one per byte
    /// within the current row. At most `BUF_SIZE` bytes.
    WriteData(&'buf [u8]),
}

impl Command {
    /// The pair of commands that program a 6-bit contrast value, low bits first. `None` when the
    /// value does not fit in 6 bits.
    pub fn contrast(value: u8) -> Option<[Command; 2]> {
        match value {
            0..=CONTRAST_MAX => Some([
                Command::SetContrastLow(value & 0x0F),
                Command::SetPowerIconContrast(true, true, (value >> 4) & 0x03),
            ]),
            _ => None,
        }
    }

    /// The command byte, or `None` when an argument is out of range.
    pub fn encode(self) -> Option<u8> {
        match self {
            Command::FunctionSet(table) => Some(
                0x38 | match table {
                    InstructionTable::Normal => 0x00,
                    InstructionTable::Extended => 0x01,
                },
            ),
            Command::SetOscillator(quarter_bias, freq) => match freq {
                0..=7 => {
                    let bs = if quarter_bias { 0x08 } else { 0x00 };
                    Some(0x10 | bs | freq)
                }
                _ => None,
            },
            Command::SetContrastLow(contrast) => match contrast {
                0..=15 => Some(0x70 | contrast),
                _ => None,
            },
            Command::SetPowerIconContrast(icon, booster, contrast) => match contrast {
                0..=3 => {
                    let ion = if icon { 0x08 } else { 0x00 };
                    let bon = if booster { 0x04 } else { 0x00 };
                    Some(0x50 | ion | bon | contrast)
                }
                _ => None,
            },
            Command::SetFollower(on, ratio) => match ratio {
                0..=7 => {
                    let fon = if on { 0x08 } else { 0x00 };
                    Some(0x60 | fon | ratio)
                }
                _ => None,
            },
            Command::SetDisplayControl(on, cursor) => {
                let d = if on { 0x04 } else { 0x00 };
                let cb = match cursor {
                    CursorMode::Off => 0x00,
                    CursorMode::Solid => 0x02,
                    CursorMode::Blinking => 0x03,
                };
                Some(0x08 | d | cb)
            }
            Command::ClearDisplay => Some(0x01),
            Command::SetEntryMode(increment, shift) => {
                let id = if increment { 0x02 } else { 0x00 };
                let s = if shift { 0x01 } else { 0x00 };
                Some(0x04 | id | s)
            }
            Command::SetDdramAddress(addr) => match addr {
                0x00..=0x07 | 0x40..=0x47 => Some(0x80 | addr),
                _ => None,
            },
        }
    }

    /// Send this command as a transaction of its own.
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        send_batch(iface, &[self])
    }
}

/// Send `cmds` together as one command transaction. Every command is encoded before anything
/// goes on the bus, so an out of range argument leaves the display untouched.
pub fn send_batch<DI>(iface: &mut DI, cmds: &[Command]) -> Result<(), Error<DI::Error>>
where
    DI: DisplayInterface,
{
    if cmds.len() > MAX_BATCH {
        return Err(Error::OutOfRange);
    }
    let mut buf = [0u8; MAX_BATCH];
    for (slot, cmd) in buf.iter_mut().zip(cmds) {
        *slot = cmd.encode().ok_or(Error::OutOfRange)?;
    }
    iface
        .send_commands(&buf[..cmds.len()])
        .map_err(Error::Bus)
}

impl<'a> BufCommand<'a> {
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        match self {
            BufCommand::WriteData(buf) if buf.len() <= BUF_SIZE => {
                iface.send_data(buf).map_err(Error::Bus)
            }
            BufCommand::WriteData(_) => Err(Error::OutOfRange),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::{Sent, TestSpyInterface};

    #[test]
    fn function_set() {
        assert_eq!(Command::FunctionSet(InstructionTable::Normal).encode(), Some(0x38));
        assert_eq!(Command::FunctionSet(InstructionTable::Extended).encode(), Some(0x39));
    }

    #[test]
    fn set_oscillator() {
        assert_eq!(Command::SetOscillator(false, 4).encode(), Some(0x14));
        assert_eq!(Command::SetOscillator(true, 7).encode(), Some(0x1F));
        assert_eq!(Command::SetOscillator(false, 8).encode(), None);
    }

    #[test]
    fn set_contrast_low() {
        assert_eq!(Command::SetContrastLow(8).encode(), Some(0x78));
        assert_eq!(Command::SetContrastLow(15).encode(), Some(0x7F));
        assert_eq!(Command::SetContrastLow(16).encode(), None);
    }

    #[test]
    fn set_power_icon_contrast() {
        assert_eq!(Command::SetPowerIconContrast(true, true, 2).encode(), Some(0x5E));
        assert_eq!(Command::SetPowerIconContrast(true, true, 0).encode(), Some(0x5C));
        assert_eq!(Command::SetPowerIconContrast(false, false, 3).encode(), Some(0x53));
        assert_eq!(Command::SetPowerIconContrast(true, true, 4).encode(), None);
    }

    #[test]
    fn set_follower() {
        assert_eq!(Command::SetFollower(true, 4).encode(), Some(0x6C));
        assert_eq!(Command::SetFollower(false, 0).encode(), Some(0x60));
        assert_eq!(Command::SetFollower(true, 8).encode(), None);
    }

    #[test]
    fn set_display_control() {
        assert_eq!(Command::SetDisplayControl(true, CursorMode::Off).encode(), Some(0x0C));
        assert_eq!(Command::SetDisplayControl(true, CursorMode::Solid).encode(), Some(0x0E));
        assert_eq!(Command::SetDisplayControl(true, CursorMode::Blinking).encode(), Some(0x0F));
        assert_eq!(Command::SetDisplayControl(false, CursorMode::Off).encode(), Some(0x08));
    }

    #[test]
    fn clear_and_entry_mode() {
        assert_eq!(Command::ClearDisplay.encode(), Some(0x01));
        assert_eq!(Command::SetEntryMode(true, false).encode(), Some(0x06));
        assert_eq!(Command::SetEntryMode(false, true).encode(), Some(0x05));
    }

    #[test]
    fn set_ddram_address() {
        assert_eq!(Command::SetDdramAddress(0x00).encode(), Some(0x80));
        assert_eq!(Command::SetDdramAddress(0x06).encode(), Some(0x86));
        assert_eq!(Command::SetDdramAddress(0x40).encode(), Some(0xC0));
        assert_eq!(Command::SetDdramAddress(0x47).encode(), Some(0xC7));
        // Off the visible part of either row.
        assert_eq!(Command::SetDdramAddress(0x08).encode(), None);
        assert_eq!(Command::SetDdramAddress(0x48).encode(), None);
        assert_eq!(Command::SetDdramAddress(0x20).encode(), None);
    }

    #[test]
    fn contrast_split() {
        assert_eq!(
            Command::contrast(32),
            Some([
                Command::SetContrastLow(0),
                Command::SetPowerIconContrast(true, true, 2)
            ])
        );
        let encoded = Command::contrast(63).map(|c| (c[0].encode(), c[1].encode()));
        assert_eq!(encoded, Some((Some(0x7F), Some(0x5F))));
        assert_eq!(Command::contrast(64), None);
    }

    #[test]
    fn cursor_mode_selector() {
        assert_eq!(CursorMode::from_selector::<()>(0), Ok(CursorMode::Off));
        assert_eq!(CursorMode::from_selector::<()>(1), Ok(CursorMode::Solid));
        assert_eq!(CursorMode::from_selector::<()>(2), Ok(CursorMode::Blinking));
        assert_eq!(
            CursorMode::from_selector::<()>(3),
            Err(Error::UnsupportedMode)
        );
    }

    #[test]
    fn batch_is_one_transaction() {
        let di = TestSpyInterface::new();
        send_batch(
            &mut di.split(),
            &[
                Command::SetDisplayControl(true, CursorMode::Off),
                Command::ClearDisplay,
                Command::SetEntryMode(true, false),
            ],
        )
        .unwrap();
        di.check_multi(sends!(cmd [0x0C, 0x01, 0x06]));
    }

    #[test]
    fn batch_rejects_before_sending() {
        let di = TestSpyInterface::new();
        assert_eq!(
            send_batch(
                &mut di.split(),
                &[Command::ClearDisplay, Command::SetDdramAddress(0x10)]
            ),
            Err(Error::OutOfRange)
        );
        assert_eq!(
            send_batch(&mut di.split(), &[Command::ClearDisplay; MAX_BATCH + 1]),
            Err(Error::OutOfRange)
        );
        di.check_multi(sends!());
    }

    #[test]
    fn write_data() {
        let di = TestSpyInterface::new();
        BufCommand::WriteData(b"HELLO").send(&mut di.split()).unwrap();
        di.check_multi(sends!(data b"HELLO"));
        assert_eq!(
            BufCommand::WriteData(&[b' '; BUF_SIZE + 1]).send(&mut di.split()),
            Err(Error::OutOfRange)
        );
    }

    #[test]
    fn bus_error_propagates() {
        let mut di = TestSpyInterface::new();
        di.fail_after(0);
        assert_eq!(Command::ClearDisplay.send(&mut di), Err(Error::Bus(())));
    }
}
