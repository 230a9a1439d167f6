//! File-like access to an attached display, for binding to a character device or any other
//! open/read/write/seek/ioctl surface.
//!
//! A `Device` owns one `Display` behind a lock. Every entry point holds the lock for the whole
//! operation, bus transactions and settle delays included, so concurrent callers are
//! serialized per device.

use spin::Mutex;

use crate::command::CursorMode;
use crate::config::Config;
use crate::display::sync::{RowAware, SyncStrategy};
use crate::display::{Control, Display, Whence};
use crate::error::Error;
use crate::interface;

/// Control request selector for setting the contrast: `_IO('h', 1)`.
pub const IOC_SET_CONTRAST: u32 = 0x6801;
/// Control request selector for setting the cursor mode: `_IO('h', 2)`.
pub const IOC_SET_CURSOR_MODE: u32 = 0x6802;

impl Control {
    /// Decode a raw control request. The contrast request takes the contrast as its argument,
    /// the cursor request a `CursorMode` selector.
    pub fn from_raw<E>(request: u32, arg: u32) -> Result<Self, Error<E>> {
        match request {
            IOC_SET_CONTRAST if arg <= u32::from(u8::max_value()) => {
                Ok(Control::SetContrast(arg as u8))
            }
            IOC_SET_CONTRAST => Err(Error::OutOfRange),
            IOC_SET_CURSOR_MODE => CursorMode::from_selector(arg).map(Control::SetCursorMode),
            _ => Err(Error::UnsupportedControl),
        }
    }
}

/// An attached display.
pub struct Device<DI, S = RowAware>
where
    DI: interface::DisplayInterface,
    S: SyncStrategy,
{
    display: Mutex<Display<DI, S>>,
}

impl<DI> Device<DI, RowAware>
where
    DI: interface::DisplayInterface,
{
    /// Bring up the display on `iface` with `config` and take ownership of it.
    pub fn attach(iface: DI, config: Config) -> Result<Self, Error<DI::Error>> {
        Self::attach_with_strategy(iface, RowAware, config)
    }
}

impl<DI, S> Device<DI, S>
where
    DI: interface::DisplayInterface,
    S: SyncStrategy,
{
    /// Like `attach`, keeping DDRAM in step with `strategy`.
    pub fn attach_with_strategy(
        iface: DI,
        strategy: S,
        config: Config,
    ) -> Result<Self, Error<DI::Error>> {
        let mut display = Display::with_strategy(iface, strategy);
        display.init(config)?;
        log::info!("display attached");
        Ok(Device {
            display: Mutex::new(display),
        })
    }

    /// Open the device. Handles share the display and its position.
    pub fn open(&self) -> Handle<'_, DI, S> {
        Handle { device: self }
    }

    /// Detach the display, giving back the interface. The buffer is dropped.
    pub fn detach(self) -> DI {
        log::info!("display detached");
        self.display.into_inner().release()
    }
}

/// An open handle on a `Device`. Reads and writes happen at the display's position.
pub struct Handle<'d, DI, S>
where
    DI: interface::DisplayInterface,
    S: SyncStrategy,
{
    device: &'d Device<DI, S>,
}

impl<'d, DI, S> Handle<'d, DI, S>
where
    DI: interface::DisplayInterface,
    S: SyncStrategy,
{
    /// Copy up to `buf.len()` bytes from the position into `buf`, returning how many were
    /// copied. Zero at or past the logical size.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut display = self.device.display.lock();
        let position = display.position();
        let bytes = display.read(position, buf.len());
        buf[..bytes.len()].copy_from_slice(bytes);
        bytes.len()
    }

    /// Write `bytes` at the position. See `Display::write`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, Error<DI::Error>> {
        let mut display = self.device.display.lock();
        let position = display.position();
        display.write(position, bytes)
    }

    /// Seek with a raw origin: 0 from the start, 1 from the position, 2 from the logical size.
    pub fn seek(&mut self, offset: i64, whence: u32) -> Result<usize, Error<DI::Error>> {
        let whence = Whence::from_raw(whence)?;
        self.device.display.lock().seek(offset, whence)
    }

    /// Apply a raw control request. See `IOC_SET_CONTRAST` and `IOC_SET_CURSOR_MODE`.
    pub fn ioctl(&mut self, request: u32, arg: u32) -> Result<(), Error<DI::Error>> {
        let control = Control::from_raw(request, arg)?;
        self.control(control)
    }

    /// Apply a typed control request.
    pub fn control(&mut self, control: Control) -> Result<(), Error<DI::Error>> {
        self.device.display.lock().control(control)
    }
}

#[cfg(feature = "std")]
mod io {
    use std::io;

    use super::Handle;
    use crate::display::sync::SyncStrategy;
    use crate::error::Error;
    use crate::interface;

    fn to_io<E>(e: Error<E>) -> io::Error {
        let kind = match e {
            Error::OutOfSpace => io::ErrorKind::WriteZero,
            Error::InvalidSeekOrigin | Error::OutOfRange => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::Other,
        };
        io::Error::from(kind)
    }

    impl<'d, DI, S> io::Read for Handle<'d, DI, S>
    where
        DI: interface::DisplayInterface,
        S: SyncStrategy,
    {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            Ok(Handle::read(self, buf))
        }
    }

    impl<'d, DI, S> io::Write for Handle<'d, DI, S>
    where
        DI: interface::DisplayInterface,
        S: SyncStrategy,
    {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Handle::write(self, buf).map_err(to_io)
        }

        fn flush(&mut self) -> io::Result<()> {
            // Every write already went through to the display.
            Ok(())
        }
    }

    impl<'d, DI, S> io::Seek for Handle<'d, DI, S>
    where
        DI: interface::DisplayInterface,
        S: SyncStrategy,
    {
        fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
            let (offset, whence) = match pos {
                io::SeekFrom::Start(offset) => (offset.min(i64::max_value() as u64) as i64, 0),
                io::SeekFrom::Current(offset) => (offset, 1),
                io::SeekFrom::End(offset) => (offset, 2),
            };
            Handle::seek(self, offset, whence)
                .map(|position| position as u64)
                .map_err(to_io)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::{Sent, TestSpyInterface};

    fn attached() -> (TestSpyInterface, Device<TestSpyInterface>) {
        let mut di = TestSpyInterface::new();
        let device = Device::attach(di.split(), Config::new()).unwrap();
        di.clear();
        (di, device)
    }

    #[test]
    fn attach_runs_init() {
        let di = TestSpyInterface::new();
        let _device = Device::attach(di.split(), Config::new()).unwrap();
        assert_eq!(di.sent()[0], Sent::Cmd(vec![0x38, 0x39, 0x14, 0x78, 0x5E, 0x6C]));
    }

    #[test]
    fn attach_fails_on_bus_error() {
        let mut di = TestSpyInterface::new();
        di.fail_after(0);
        assert!(Device::attach(di.split(), Config::new()).is_err());
    }

    #[test]
    fn handle_writes_and_reads_at_position() {
        let (di, device) = attached();
        let mut handle = device.open();
        assert_eq!(handle.write(b"HELLO"), Ok(5));
        assert_eq!(handle.write(b"WORLD"), Ok(5));
        #[cfg_attr(rustfmt, rustfmt_skip)]
        di.check_multi(sends!(
            cmd [0x80], us 27,
            data b"HELLO",
            cmd [0x85], us 27,
            data b"WOR",
            cmd [0xC0], us 27,
            data b"LD"
        ));

        assert_eq!(handle.seek(0, 0), Ok(0));
        let mut buf = [0u8; 32];
        assert_eq!(handle.read(&mut buf), 10);
        assert_eq!(&buf[..10], b"HELLOWORLD");
        assert_eq!(handle.read(&mut buf), 0);
    }

    #[test]
    fn handles_share_position() {
        let (_di, device) = attached();
        let mut a = device.open();
        let mut b = device.open();
        a.write(b"AB").unwrap();
        b.write(b"CD").unwrap();
        assert_eq!(a.seek(0, 0), Ok(0));
        let mut buf = [0u8; 4];
        assert_eq!(b.read(&mut buf), 4);
        assert_eq!(&buf, b"ABCD");
    }

    #[test]
    fn seek_rejects_unknown_origin() {
        let (di, device) = attached();
        let mut handle = device.open();
        handle.write(b"XYZ").unwrap();
        let mut di = di;
        di.clear();
        assert_eq!(handle.seek(0, 3), Err(Error::InvalidSeekOrigin));
        di.check_multi(sends!());
        assert_eq!(handle.seek(0, 1), Ok(3));
    }

    #[test]
    fn ioctl_dispatch() {
        let (di, device) = attached();
        let mut handle = device.open();
        handle.ioctl(IOC_SET_CONTRAST, 63).unwrap();
        handle.ioctl(IOC_SET_CURSOR_MODE, 2).unwrap();
        assert_eq!(
            handle.ioctl(IOC_SET_CURSOR_MODE, 7),
            Err(Error::UnsupportedMode)
        );
        assert_eq!(handle.ioctl(IOC_SET_CONTRAST, 64), Err(Error::OutOfRange));
        assert_eq!(handle.ioctl(IOC_SET_CONTRAST, 0x1_00), Err(Error::OutOfRange));
        assert_eq!(handle.ioctl(0x6803, 0), Err(Error::UnsupportedControl));
        di.check_multi(sends!(cmd [0x7F], cmd [0x5F], cmd [0x0F]));
    }

    #[test]
    fn detach_returns_interface() {
        let (_di, device) = attached();
        let _iface: TestSpyInterface = device.detach();
    }

    #[cfg(feature = "std")]
    #[test]
    fn std_io_traits() {
        use std::io::{Read, Seek, SeekFrom, Write};

        let (_di, device) = attached();
        let mut handle = device.open();
        handle.write_all(b"0123456789ABCDE").unwrap();
        assert_eq!(
            Write::write(&mut handle, b"!").unwrap_err().kind(),
            std::io::ErrorKind::WriteZero
        );
        assert_eq!(Seek::seek(&mut handle, SeekFrom::End(-5)).unwrap(), 10);
        let mut tail = String::new();
        handle.read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "ABCDE");
        assert_eq!(Seek::seek(&mut handle, SeekFrom::Start(99)).unwrap(), 15);
    }
}
