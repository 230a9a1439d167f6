//! The transport between the driver and the AQM0802A module. Every transaction starts with a
//! control byte that tells the ST7032 whether the rest of the transfer is a command stream or a
//! stream of DDRAM data; it is the I2C counterpart of a D/C pin.

/// A transport that can deliver command and data transactions to the display controller and
/// wait out the controller's settle delays.
pub trait DisplayInterface {
    type Error;

    /// Send `cmds` as a command transaction. Transports with a frame limit may split a long
    /// stream over several transactions, but never drop bytes.
    fn send_commands(&mut self, cmds: &[u8]) -> Result<(), Self::Error>;
    /// Send `buf` as a DDRAM data transaction, split like `send_commands` if need be.
    fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error>;
    /// Block for at least `us` microseconds.
    fn delay_us(&mut self, us: u16);
    /// Block for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u16);
}

pub mod i2c {
    //! The I2C interface. The ST7032 is write-only on this module, so only
    //! `embedded_hal::blocking::i2c::Write` is required of the bus.

    use super::DisplayInterface;

    /// The 7-bit slave address the AQM0802A answers on.
    pub const DEFAULT_ADDRESS: u8 = 0x3E;

    /// Largest payload carried by a single transaction: a whole buffer's worth of characters.
    /// Longer payloads go out as several transactions, each with its own control byte.
    pub const MAX_PAYLOAD: usize = 16;

    /// Control byte: Co = 0, RS = 0. The rest of the transfer is a command stream.
    const CONTROL_COMMAND: u8 = 0x00;
    /// Control byte: Co = 0, RS = 1. The rest of the transfer is written to DDRAM.
    const CONTROL_DATA: u8 = 0x40;

    pub struct I2cInterface<I2C, D> {
        /// The I2C master the module is attached to.
        i2c: I2C,
        /// A blocking delay provider for the controller's settle times.
        delay: D,
        address: u8,
    }

    impl<I2C, D> I2cInterface<I2C, D>
    where
        I2C: hal::blocking::i2c::Write,
        D: hal::blocking::delay::DelayUs<u16> + hal::blocking::delay::DelayMs<u16>,
    {
        /// Create a new I2C interface talking to the module at `DEFAULT_ADDRESS`.
        pub fn new(i2c: I2C, delay: D) -> Self {
            Self {
                i2c,
                delay,
                address: DEFAULT_ADDRESS,
            }
        }

        /// Talk to a module strapped to a different slave address.
        pub fn address(self, address: u8) -> Self {
            Self { address, ..self }
        }

        /// Give back the bus and the delay provider.
        pub fn release(self) -> (I2C, D) {
            (self.i2c, self.delay)
        }

        fn transfer(&mut self, control: u8, payload: &[u8]) -> Result<(), I2C::Error> {
            // The controller keeps its address pointer across transactions, so a split data
            // stream lands where a single one would.
            let mut frame = [0u8; MAX_PAYLOAD + 1];
            frame[0] = control;
            for chunk in payload.chunks(MAX_PAYLOAD) {
                frame[1..=chunk.len()].copy_from_slice(chunk);
                self.i2c.write(self.address, &frame[..=chunk.len()])?;
            }
            Ok(())
        }
    }

    impl<I2C, D> DisplayInterface for I2cInterface<I2C, D>
    where
        I2C: hal::blocking::i2c::Write,
        D: hal::blocking::delay::DelayUs<u16> + hal::blocking::delay::DelayMs<u16>,
    {
        type Error = I2C::Error;

        fn send_commands(&mut self, cmds: &[u8]) -> Result<(), Self::Error> {
            self.transfer(CONTROL_COMMAND, cmds)
        }

        fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            self.transfer(CONTROL_DATA, buf)
        }

        fn delay_us(&mut self, us: u16) {
            self.delay.delay_us(us);
        }

        fn delay_ms(&mut self, ms: u16) {
            self.delay.delay_ms(ms);
        }
    }

}

#[cfg(test)]
#[macro_use]
pub mod test_spy {
    //! An interface for use in unit tests to spy on whatever was sent to it.

    use super::DisplayInterface;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    macro_rules! sent {
        (cmd [$($b:expr),*]) => {Sent::Cmd(vec![$($b,)*])};
        (data [$($b:expr),*]) => {Sent::Data(vec![$($b,)*])};
        (data $s:expr) => {Sent::Data($s.to_vec())};
        (us $n:expr) => {Sent::DelayUs($n)};
        (ms $n:expr) => {Sent::DelayMs($n)};
    }
    macro_rules! sends {
        ($($kind:ident $arg:tt),* $(,)*) => {&[$(sent!($kind $arg),)*]};
    }

    /// One observed interaction with the transport.
    #[derive(Clone, Debug, PartialEq)]
    pub enum Sent {
        Cmd(Vec<u8>),
        Data(Vec<u8>),
        DelayUs(u16),
        DelayMs(u16),
    }

    #[derive(Default)]
    struct Log {
        sent: Vec<Sent>,
        /// Number of further transactions to accept before failing every one after.
        fail_after: Option<usize>,
    }

    /// Clones share one log, so a test can keep a handle after moving the interface into a
    /// `Display`.
    #[derive(Clone, Default)]
    pub struct TestSpyInterface {
        log: Rc<RefCell<Log>>,
    }

    impl TestSpyInterface {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn split(&self) -> Self {
            self.clone()
        }
        pub fn check_multi(&self, expect: &[Sent]) {
            assert_eq!(self.log.borrow().sent, expect);
        }
        pub fn sent(&self) -> Vec<Sent> {
            self.log.borrow().sent.clone()
        }
        pub fn clear(&mut self) {
            self.log.borrow_mut().sent.clear()
        }
        /// Let `n` more transactions through, then fail every transaction.
        pub fn fail_after(&mut self, n: usize) {
            self.log.borrow_mut().fail_after = Some(n);
        }

        fn record(&mut self, sent: Sent) -> Result<(), ()> {
            let mut log = self.log.borrow_mut();
            match log.fail_after {
                Some(0) => return Err(()),
                Some(ref mut n) => *n -= 1,
                None => {}
            }
            log.sent.push(sent);
            Ok(())
        }
    }

    impl DisplayInterface for TestSpyInterface {
        type Error = ();

        fn send_commands(&mut self, cmds: &[u8]) -> Result<(), ()> {
            self.record(Sent::Cmd(cmds.to_vec()))
        }
        fn send_data(&mut self, buf: &[u8]) -> Result<(), ()> {
            self.record(Sent::Data(buf.to_vec()))
        }
        fn delay_us(&mut self, us: u16) {
            self.log.borrow_mut().sent.push(Sent::DelayUs(us));
        }
        fn delay_ms(&mut self, ms: u16) {
            self.log.borrow_mut().sent.push(Sent::DelayMs(ms));
        }
    }
}
