//! Driver library for the Xiamen Zettler AQM0802A 8x2 character LCD module, built around the
//! Sitronix ST7032 controller and attached over I2C.
//!
//! The two rows of eight characters are presented as one 16-byte text buffer that can be
//! written, read and seeked. Writes are pushed through to the module's DDRAM as they happen,
//! split at the row boundary since the two rows live at non-adjacent DDRAM addresses.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate embedded_hal as hal;

#[macro_use]
pub mod interface;
pub mod command;
pub mod config;
pub mod device;
pub mod display;
pub mod error;

// Re-exports for primary API.
pub use command::{consts, CursorMode};
pub use config::Config;
pub use device::{Device, Handle};
pub use display::sync::{FullRefresh, RowAware, SyncStrategy};
pub use display::{Control, Display, Whence};
pub use error::Error;
pub use interface::i2c::I2cInterface;
pub use interface::DisplayInterface;
