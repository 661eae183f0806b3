//! Driver for the Bosch BME280 combined temperature/pressure/humidity
//! sensor, generic over the `embedded-hal` blocking I2C traits.
//!
//! The sensor exposes raw 20-bit (temperature, pressure) and 16-bit
//! (humidity) ADC codes plus a block of factory calibration coefficients;
//! this crate turns those into °C, Pa and %RH with the datasheet's
//! fixed-point compensation formulas.
//!
//! The included binary wires the driver to a Raspberry Pi via `rppal`.

mod compensation;
mod config;
mod device;
mod structs;

pub use compensation::{
    compensate_humidity, compensate_pressure, compensate_temperature, FineTemperature,
};
pub use config::{
    with_filter, with_mode, with_oversampling_pressure, with_oversampling_temperature,
    with_standby_time, Configuration, Filter, Mode, Oversampling, StandbyTime,
};
pub use device::Bme280;
pub use structs::{CalibrationData, RawSample};

// BME280 I2C slave addresses (SDO pin selects between them).
pub const ADDR_PRIMARY: u8 = 0x76;
pub const ADDR_SECONDARY: u8 = 0x77;

/// Value the ID register reads back as on a genuine BME280.
pub const CHIP_ID: u8 = 0x60;

// BME280 register addresses.
// cf. https://www.bosch-sensortec.com/media/boschsensortec/downloads/datasheets/bst-bme280-ds002.pdf
pub const REG_ID: u8 = 0xD0;
pub const REG_RESET: u8 = 0xE0;
pub const REG_CTRL_HUM: u8 = 0xF2;
pub const REG_STATUS: u8 = 0xF3;
pub const REG_CTRL_MEAS: u8 = 0xF4;
pub const REG_CONFIG: u8 = 0xF5;
pub const REG_PRESS_MSB: u8 = 0xF7;
pub const REG_PRESS_LSB: u8 = 0xF8;
pub const REG_PRESS_XLSB: u8 = 0xF9;
pub const REG_TEMP_MSB: u8 = 0xFA;
pub const REG_TEMP_LSB: u8 = 0xFB;
pub const REG_TEMP_XLSB: u8 = 0xFC;
pub const REG_HUM_MSB: u8 = 0xFD;
pub const REG_HUM_LSB: u8 = 0xFE;

// Calibration blocks. The 0x88 block is read through register 0xA1 so the
// H1 coefficient arrives via a fault-detecting block read; byte 24 (0xA0)
// is a filler register.
pub const REG_CALIB_00: u8 = 0x88;
pub const REG_CALIB_26: u8 = 0xE1;
pub const CALIB_00_LEN: usize = 26;
pub const CALIB_26_LEN: usize = 7;

/// Writing this to [`REG_RESET`] triggers a soft reset.
pub const RESET_COMMAND: u8 = 0xB6;

/// STATUS register bit 3: a measurement cycle is in progress.
pub const STATUS_MEASURING: u8 = 0x08;

/// Driver errors, parameterized over the transport's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error<E> {
    /// No device acknowledged at the configured address. Fatal to
    /// initialization; retrying later may succeed.
    BusUnavailable(E),
    /// The ID register did not read back as [`CHIP_ID`]; carries the byte
    /// that was seen. Fatal to initialization.
    IdentityMismatch(u8),
    /// A block read failed mid-transaction. Calibration loading surfaces
    /// this instead of degrading, since silently wrong coefficients would
    /// corrupt every reading.
    ReadFailure(E),
    /// A register write failed. The device may be left with a partially
    /// applied configuration; re-issuing the setter recovers.
    WriteFailure(E),
}
