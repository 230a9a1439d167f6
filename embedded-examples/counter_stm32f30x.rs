//! Full example code for driving an AQM0802A module. This runs on an STM32F303RE, with the
//! module on I2C1 (PB6 for SCL, PB7 for SDA) and external 10k pull-ups on both lines.
//!
//! The top row shows a fixed label; the bottom row counts up about once a second.

#![deny(unsafe_code)]
#![no_main]
#![no_std]

extern crate aqm0802a;
extern crate cortex_m;
extern crate stm32f30x;
extern crate stm32f30x_hal as hal;
#[macro_use]
extern crate cortex_m_rt;
extern crate panic_abort;

use aqm0802a as lcd;
use cortex_m::asm;
use cortex_m_rt::ExceptionFrame;
use hal::i2c::I2c;
use hal::prelude::*;

entry!(main);

exception!(*, default_handler);
exception!(HardFault, hard_fault);

fn hard_fault(_ef: &ExceptionFrame) -> ! {
    asm::bkpt();
    loop {}
}

fn default_handler(_irqn: i16) {
    loop {}
}

fn main() -> ! {
    // Get peripherals and set up RCC.
    let cp = cortex_m::Peripherals::take().unwrap();
    let dp = stm32f30x::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze(&mut flash.acr);
    let delay = hal::delay::Delay::new(cp.SYST, clocks);

    // I2C1 is Alternate Function 4 for GPIOs PB6,7.
    let mut gpiob = dp.GPIOB.split(&mut rcc.ahb);
    let scl = gpiob.pb6.into_af4(&mut gpiob.moder, &mut gpiob.afrl);
    let sda = gpiob.pb7.into_af4(&mut gpiob.moder, &mut gpiob.afrl);
    let i2c = I2c::i2c1(dp.I2C1, (scl, sda), 100.khz(), clocks, &mut rcc.apb1);

    // The interface owns the delay provider, which it needs for the controller's settle times.
    let mut disp = lcd::Display::new(lcd::I2cInterface::new(i2c, delay));

    // Contrast 40 suits the 3.3V supply of this board; the module's own default is lighter.
    disp.init(lcd::Config::new().contrast(40)).unwrap();
    disp.write(0, b"uptime").unwrap();

    let mut seconds: u32 = 0;
    let mut digits = [b' '; lcd::consts::NUM_COLS];
    loop {
        // Right-align the count in the bottom row.
        let mut n = seconds;
        for (i, d) in digits.iter_mut().rev().enumerate() {
            *d = if n > 0 || i == 0 { b'0' + (n % 10) as u8 } else { b' ' };
            n /= 10;
        }
        disp.write(lcd::consts::ROW_BOUNDARY, &digits).unwrap();

        // Off by the bus time, which is close enough for a demo.
        for _ in 0..1000 {
            asm::delay(8_000);
        }
        seconds = seconds.wrapping_add(1);
    }
}
