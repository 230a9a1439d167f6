//! Keeping DDRAM in step with the text buffer.
//!
//! A strategy turns a written range of the buffer into a `Plan`: the exact transfers that make
//! DDRAM match the buffer over that range. Planning touches no hardware, so strategies can be
//! checked without a bus; `Plan::issue` then drives the transfers through a `DisplayInterface`,
//! inserting the settle delays each transfer needs.

use core::ops::Range;

use heapless::Vec;

use crate::command::consts::*;
use crate::command::{BufCommand, Command};
use crate::display::row::{ddram_address, Row};
use crate::error::Error;
use crate::interface;

/// Upper bound on the transfers of any plan: an address set and a data transfer for each row.
pub const MAX_TRANSFERS: usize = 2 * NUM_ROWS;

/// One step of a synchronization plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transfer<'a> {
    /// Point the controller at a DDRAM address, then wait `ADDRESS_SETTLE_US`.
    AddressSet(u8),
    /// Write characters at the address pointer. Never crosses a row.
    DataTransfer(&'a [u8]),
    /// Blank DDRAM and home the pointer, then wait `CLEAR_SETTLE_MS`.
    ClearDisplay,
}

impl<'a> Transfer<'a> {
    /// Deliver this transfer and wait out its settle time. Each transfer is one bus
    /// transaction; a failed transaction is returned as is and never retried.
    pub fn issue<DI>(&self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: interface::DisplayInterface,
    {
        match *self {
            Transfer::AddressSet(addr) => {
                Command::SetDdramAddress(addr).send(iface)?;
                iface.delay_us(ADDRESS_SETTLE_US);
            }
            Transfer::DataTransfer(bytes) => BufCommand::WriteData(bytes).send(iface)?,
            Transfer::ClearDisplay => {
                Command::ClearDisplay.send(iface)?;
                iface.delay_ms(CLEAR_SETTLE_MS);
            }
        }
        Ok(())
    }
}

/// An ordered list of transfers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan<'a>(Vec<Transfer<'a>, MAX_TRANSFERS>);

impl<'a> Plan<'a> {
    pub fn new() -> Self {
        Plan(Vec::new())
    }

    /// Append `transfer`, handing it back when the plan already holds `MAX_TRANSFERS`.
    pub fn push(&mut self, transfer: Transfer<'a>) -> Result<(), Transfer<'a>> {
        self.0.push(transfer)
    }

    fn add(&mut self, transfer: Transfer<'a>) {
        let pushed = self.push(transfer);
        debug_assert!(pushed.is_ok(), "plan exceeds {} transfers", MAX_TRANSFERS);
    }

    pub fn transfers(&self) -> &[Transfer<'a>] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Issue every transfer in order, stopping at the first failure. Transfers already
    /// delivered are not rolled back.
    pub fn issue<DI>(&self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: interface::DisplayInterface,
    {
        self.0.iter().try_for_each(|t| t.issue(iface))
    }
}

/// A way of bringing DDRAM back in line with the buffer after `range` of it was written.
pub trait SyncStrategy {
    /// Plan the transfers for a write that touched `range` of `contents`. `range` lies within
    /// the buffer and may be empty.
    fn plan<'a>(&self, contents: &'a [u8; BUF_SIZE], range: Range<usize>) -> Plan<'a>;
}

/// Rewrites only the cells in the written range, one address set and one data transfer per row
/// touched.
///
/// The controller advances its address pointer within a row but not from the end of row 0 to
/// the start of row 1, since the rows sit at non-adjacent DDRAM addresses. A transfer therefore
/// never crosses the row boundary. When the row 0 part of a write runs right up to the boundary,
/// the pointer is moved to the start of row 1 at once, so a write continuing from there lands in
/// the right place.
#[derive(Clone, Copy, Debug, Default)]
pub struct RowAware;

impl SyncStrategy for RowAware {
    fn plan<'a>(&self, contents: &'a [u8; BUF_SIZE], range: Range<usize>) -> Plan<'a> {
        let mut plan = Plan::new();
        let mut pointer_primed = false;

        let top = Row::Top.clip(&range);
        if !top.is_empty() {
            plan.add(Transfer::AddressSet(ddram_address(top.start)));
            plan.add(Transfer::DataTransfer(&contents[top.clone()]));
            if top.end == ROW_BOUNDARY {
                plan.add(Transfer::AddressSet(Row::Bottom.base()));
                pointer_primed = true;
            }
        }

        let bottom = Row::Bottom.clip(&range);
        if !bottom.is_empty() {
            if !pointer_primed {
                plan.add(Transfer::AddressSet(ddram_address(bottom.start)));
            }
            plan.add(Transfer::DataTransfer(&contents[bottom]));
        }

        plan
    }
}

/// Clears the display and rewrites both rows in full on every write, whatever was written.
/// Simple, but the whole display flickers even for a single changed cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct FullRefresh;

impl SyncStrategy for FullRefresh {
    fn plan<'a>(&self, contents: &'a [u8; BUF_SIZE], _range: Range<usize>) -> Plan<'a> {
        let mut plan = Plan::new();
        // Clearing homes the pointer to the start of row 0.
        plan.add(Transfer::ClearDisplay);
        plan.add(Transfer::DataTransfer(&contents[Row::Top.span()]));
        plan.add(Transfer::AddressSet(Row::Bottom.base()));
        plan.add(Transfer::DataTransfer(&contents[Row::Bottom.span()]));
        plan
    }
}
