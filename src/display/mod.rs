//! The main API to the display driver. `Display` holds the text shown on the module as a
//! 16-byte buffer that can be written, read and seeked like a small file; every write is pushed
//! through to DDRAM before it returns.

pub mod row;
pub mod sync;

use core::cmp;

use crate::command::consts::*;
use crate::command::*;
use crate::config::{self, Config};
use crate::display::row::ddram_address;
use crate::display::sync::{RowAware, SyncStrategy, Transfer};
use crate::error::Error;
use crate::interface;

/// The origin a seek offset is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Whence {
    /// From offset 0.
    FromStart,
    /// From the current position.
    FromCurrent,
    /// From the logical size: the furthest offset ever written or sought to.
    FromEnd,
}

impl Whence {
    /// Decode a raw seek origin: 0, 1 and 2 name `FromStart`, `FromCurrent` and `FromEnd`.
    /// Anything else is rejected with `Error::InvalidSeekOrigin`.
    pub fn from_raw<E>(raw: u32) -> Result<Self, Error<E>> {
        match raw {
            0 => Ok(Whence::FromStart),
            1 => Ok(Whence::FromCurrent),
            2 => Ok(Whence::FromEnd),
            _ => Err(Error::InvalidSeekOrigin),
        }
    }
}

/// A control request on the display, independent of the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    SetContrast(u8),
    SetCursorMode(CursorMode),
}

/// A driver for an AQM0802A display.
pub struct Display<DI, S = RowAware>
where
    DI: interface::DisplayInterface,
    S: SyncStrategy,
{
    iface: DI,
    strategy: S,
    contents: [u8; BUF_SIZE],
    logical_size: usize,
    position: usize,
}

impl<DI> Display<DI, RowAware>
where
    DI: interface::DisplayInterface,
{
    /// Construct a new display driver for a display connected to the interface `iface`, which
    /// only rewrites the cells each write touches.
    pub fn new(iface: DI) -> Self {
        Self::with_strategy(iface, RowAware)
    }
}

impl<DI, S> Display<DI, S>
where
    DI: interface::DisplayInterface,
    S: SyncStrategy,
{
    /// Construct a new display driver that keeps DDRAM in step using `strategy`.
    ///
    /// The buffer starts out as spaces with a logical size of zero, which is what DDRAM holds
    /// after `init` clears it.
    pub fn with_strategy(iface: DI, strategy: S) -> Self {
        Display {
            iface,
            strategy,
            contents: [b' '; BUF_SIZE],
            logical_size: 0,
            position: 0,
        }
    }

    /// Bring the module up and apply `config`.
    ///
    /// The controller ignores or misreads commands that arrive before it has finished the
    /// previous group, so the order and the delays here must not be changed.
    pub fn init(&mut self, config: Config) -> Result<(), Error<DI::Error>> {
        let [contrast_low, power_icon_contrast] =
            Command::contrast(POWER_ON_CONTRAST).ok_or(Error::OutOfRange)?;
        send_batch(
            &mut self.iface,
            &[
                Command::FunctionSet(InstructionTable::Normal),
                Command::FunctionSet(InstructionTable::Extended),
                Command::SetOscillator(false, 4),
                contrast_low,
                power_icon_contrast,
                Command::SetFollower(true, 4),
            ],
        )
        .map_err(warn_on_bus)?;
        self.iface.delay_ms(POWER_ON_SETTLE_MS);
        send_batch(
            &mut self.iface,
            &[
                Command::SetDisplayControl(true, CursorMode::Off),
                Command::ClearDisplay,
                Command::SetEntryMode(true, false),
            ],
        )
        .map_err(warn_on_bus)?;
        self.iface.delay_ms(DISPLAY_ON_SETTLE_MS);
        config.send(&mut self.iface).map_err(warn_on_bus)?;
        log::info!("display initialized");
        Ok(())
    }

    /// Store `bytes` at `offset` and push them through to the display.
    ///
    /// At most `BUF_SIZE - offset` bytes are accepted; the rest are silently dropped, and the
    /// number accepted is returned. A write starting at or past `WRITE_LIMIT` fails with
    /// `Error::OutOfSpace` and changes nothing.
    ///
    /// On `Error::Bus` the buffer already holds the new bytes although the display may not
    /// show them; `resync` repairs that.
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<usize, Error<DI::Error>> {
        if offset >= WRITE_LIMIT {
            return Err(Error::OutOfSpace);
        }
        let written = cmp::min(bytes.len(), BUF_SIZE - offset);
        let range = offset..offset + written;
        self.contents[range.clone()].copy_from_slice(&bytes[..written]);
        self.position = range.end;
        self.logical_size = cmp::max(self.logical_size, self.position);

        let plan = self.strategy.plan(&self.contents, range);
        log::debug!(
            "write {}..{}: {} transfers",
            offset,
            offset + written,
            plan.transfers().len()
        );
        plan.issue(&mut self.iface).map_err(warn_on_bus)?;
        Ok(written)
    }

    /// The stored bytes from `offset`, at most `count` of them, stopping at the logical size.
    /// Empty when `offset` is at or past the logical size. The position moves past the bytes
    /// returned.
    pub fn read(&mut self, offset: usize, count: usize) -> &[u8] {
        if offset >= self.logical_size {
            return &[];
        }
        let end = offset + cmp::min(count, self.logical_size - offset);
        self.position = end;
        &self.contents[offset..end]
    }

    /// Move the position and the display's address pointer. The result is clamped to
    /// `0..=POSITION_MAX`; seeking past the logical size extends it.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<usize, Error<DI::Error>> {
        let origin = match whence {
            Whence::FromStart => 0,
            Whence::FromCurrent => self.position,
            Whence::FromEnd => self.logical_size,
        };
        let target = (origin as i64).saturating_add(offset);
        let position = cmp::min(cmp::max(target, 0), POSITION_MAX as i64) as usize;
        self.position = position;
        self.logical_size = cmp::max(self.logical_size, position);

        log::debug!("seek to {}", position);
        Transfer::AddressSet(ddram_address(position))
            .issue(&mut self.iface)
            .map_err(warn_on_bus)?;
        Ok(position)
    }

    /// Push the whole buffer to the display again, for recovering after a bus error.
    pub fn resync(&mut self) -> Result<(), Error<DI::Error>> {
        log::debug!("resync");
        self.strategy
            .plan(&self.contents, 0..BUF_SIZE)
            .issue(&mut self.iface)
            .map_err(warn_on_bus)
    }

    /// Control the contrast. Range is 0-63. Always sent, whatever was set before.
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), Error<DI::Error>> {
        log::debug!("contrast {}", contrast);
        config::send_contrast(&mut self.iface, contrast).map_err(warn_on_bus)
    }

    /// Control how the cursor is shown.
    pub fn set_cursor_mode(&mut self, mode: CursorMode) -> Result<(), Error<DI::Error>> {
        log::debug!("cursor mode {:?}", mode);
        Command::SetDisplayControl(true, mode)
            .send(&mut self.iface)
            .map_err(warn_on_bus)
    }

    /// Apply a control request.
    pub fn control(&mut self, control: Control) -> Result<(), Error<DI::Error>> {
        match control {
            Control::SetContrast(contrast) => self.set_contrast(contrast),
            Control::SetCursorMode(mode) => self.set_cursor_mode(mode),
        }
    }

    /// The whole buffer, including cells past the logical size.
    pub fn contents(&self) -> &[u8; BUF_SIZE] {
        &self.contents
    }

    pub fn logical_size(&self) -> usize {
        self.logical_size
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Give back the interface.
    pub fn release(self) -> DI {
        self.iface
    }
}

fn warn_on_bus<E>(e: Error<E>) -> Error<E> {
    if e.is_bus() {
        log::warn!("bus transfer failed, display may not match buffer");
    }
    e
}
