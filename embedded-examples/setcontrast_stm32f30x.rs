//! Sets the contrast of an AQM0802A module and leaves it alone. This runs on an STM32F303RE,
//! with the module on I2C1 (PB6 for SCL, PB7 for SDA).
//!
//! The contrast goes through a `Handle` the same way a userland tool would set it on a device
//! node: open, one control request, close.

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
use lcd::device::IOC_SET_CONTRAST;

/// Contrast to apply, 0-63.
const CONTRAST: u32 = 48;

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
    let cp = cortex_m::Peripherals::take().unwrap();
    let dp = stm32f30x::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze(&mut flash.acr);
    let delay = hal::delay::Delay::new(cp.SYST, clocks);

    let mut gpiob = dp.GPIOB.split(&mut rcc.ahb);
    let scl = gpiob.pb6.into_af4(&mut gpiob.moder, &mut gpiob.afrl);
    let sda = gpiob.pb7.into_af4(&mut gpiob.moder, &mut gpiob.afrl);
    let i2c = I2c::i2c1(dp.I2C1, (scl, sda), 100.khz(), clocks, &mut rcc.apb1);

    // Attaching runs the power-on sequence with the default contrast.
    let device = lcd::Device::attach(lcd::I2cInterface::new(i2c, delay), lcd::Config::new())
        .unwrap();

    {
        let mut handle = device.open();
        if handle.ioctl(IOC_SET_CONTRAST, CONTRAST).is_err() {
            asm::bkpt();
        }
    }

    // Hand the bus back; the module keeps the contrast it was given.
    let (_i2c, _delay) = device.detach().release();

    loop {
        asm::wfi();
    }
}
