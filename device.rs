use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};
use log::{debug, warn};

use crate::compensation::{compensate_humidity, compensate_pressure, compensate_temperature};
use crate::config::{
    with_filter, with_mode, with_oversampling_pressure, with_oversampling_temperature,
    with_standby_time, Configuration, Filter, Mode, Oversampling, StandbyTime, OSRS_H_MASK,
};
use crate::structs::{CalibrationData, RawSample};
use crate::{
    Error, ADDR_PRIMARY, CALIB_00_LEN, CALIB_26_LEN, CHIP_ID, REG_CALIB_00, REG_CALIB_26,
    REG_CONFIG, REG_CTRL_HUM, REG_CTRL_MEAS, REG_HUM_LSB, REG_HUM_MSB, REG_ID, REG_PRESS_LSB,
    REG_PRESS_MSB, REG_PRESS_XLSB, REG_RESET, REG_STATUS, REG_TEMP_LSB, REG_TEMP_MSB,
    REG_TEMP_XLSB, RESET_COMMAND, STATUS_MEASURING,
};

/// Settle time after a soft reset before the part answers again.
const RESET_DELAY_MS: u32 = 100;

/// BME280 device facade.
///
/// Owns the bus transport, a delay provider and the calibration loaded at
/// [`initialize`](Bme280::initialize). One instance per sensor; not safe
/// for unsynchronized concurrent use.
pub struct Bme280<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    calibration: Option<CalibrationData>,
}

impl<I2C, D, E> Bme280<I2C, D>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
{
    /// Creates a driver at the primary address 0x76.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, ADDR_PRIMARY)
    }

    /// Creates a driver at an explicit address (0x77 when SDO is high).
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Bme280 {
            i2c,
            delay,
            address,
            calibration: None,
        }
    }

    /// Bus address this driver talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Releases the bus transport.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Brings the sensor to a ready state: probe, identify, soft reset,
    /// re-identify, load calibration, apply the default configuration.
    ///
    /// Fails with [`Error::BusUnavailable`] when nothing acknowledges at
    /// the configured address and with [`Error::IdentityMismatch`] when
    /// the part is not a BME280; neither leaves calibration loaded.
    pub fn initialize(&mut self) -> Result<(), Error<E>> {
        self.i2c
            .write(self.address, &[])
            .map_err(Error::BusUnavailable)?;

        let id = self.chip_id();
        if id != CHIP_ID {
            return Err(Error::IdentityMismatch(id));
        }
        debug!("BME280 at 0x{:02X}, chip id 0x{:02X}", self.address, id);

        self.reset()?;
        self.delay.delay_ms(RESET_DELAY_MS);

        let id = self.chip_id();
        if id != CHIP_ID {
            return Err(Error::IdentityMismatch(id));
        }

        self.load_calibration()?;
        self.apply_configuration(&Configuration::default())
    }

    /// Whether a responsive BME280 answers at the configured address.
    pub fn is_present(&mut self) -> bool {
        self.chip_id() == CHIP_ID
    }

    /// Reads the chip identifier register (0x60 on a BME280).
    pub fn chip_id(&mut self) -> u8 {
        self.read_register(REG_ID)
    }

    /// Triggers a soft reset. Configuration is volatile, so the full
    /// setup sequence must be re-applied afterwards.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.write_register(REG_RESET, RESET_COMMAND)
    }

    /// Whether a measurement cycle is currently running.
    pub fn is_measuring(&mut self) -> bool {
        self.read_register(REG_STATUS) & STATUS_MEASURING != 0
    }

    /// Sets the power mode, preserving the oversampling fields.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<E>> {
        let ctrl_meas = self.read_register(REG_CTRL_MEAS);
        self.write_register(REG_CTRL_MEAS, with_mode(ctrl_meas, mode))
    }

    /// Sets the temperature oversampling factor.
    pub fn set_oversampling_temperature(
        &mut self,
        oversampling: Oversampling,
    ) -> Result<(), Error<E>> {
        let ctrl_meas = self.read_register(REG_CTRL_MEAS);
        self.write_register(
            REG_CTRL_MEAS,
            with_oversampling_temperature(ctrl_meas, oversampling),
        )
    }

    /// Sets the pressure oversampling factor.
    pub fn set_oversampling_pressure(
        &mut self,
        oversampling: Oversampling,
    ) -> Result<(), Error<E>> {
        let ctrl_meas = self.read_register(REG_CTRL_MEAS);
        self.write_register(
            REG_CTRL_MEAS,
            with_oversampling_pressure(ctrl_meas, oversampling),
        )
    }

    /// Sets the humidity oversampling factor.
    ///
    /// The device latches CTRL_HUM only on the next CTRL_MEAS write, so
    /// the current CTRL_MEAS value is re-written unchanged to commit.
    pub fn set_oversampling_humidity(
        &mut self,
        oversampling: Oversampling,
    ) -> Result<(), Error<E>> {
        self.write_register(REG_CTRL_HUM, (oversampling as u8) & OSRS_H_MASK)?;
        let ctrl_meas = self.read_register(REG_CTRL_MEAS);
        self.write_register(REG_CTRL_MEAS, ctrl_meas)
    }

    /// Sets the IIR filter coefficient.
    pub fn set_filter(&mut self, filter: Filter) -> Result<(), Error<E>> {
        let config = self.read_register(REG_CONFIG);
        self.write_register(REG_CONFIG, with_filter(config, filter))
    }

    /// Sets the standby interval used in normal mode.
    pub fn set_standby_time(&mut self, standby: StandbyTime) -> Result<(), Error<E>> {
        let config = self.read_register(REG_CONFIG);
        self.write_register(REG_CONFIG, with_standby_time(config, standby))
    }

    /// Applies a full configuration, mode last so measurements only start
    /// once every field is in place. Setters are independent; a failure
    /// part-way leaves the device recoverable by re-applying.
    pub fn apply_configuration(&mut self, configuration: &Configuration) -> Result<(), Error<E>> {
        self.set_oversampling_temperature(configuration.oversampling_temperature)?;
        self.set_oversampling_pressure(configuration.oversampling_pressure)?;
        self.set_oversampling_humidity(configuration.oversampling_humidity)?;
        self.set_filter(configuration.filter)?;
        self.set_standby_time(configuration.standby_time)?;
        self.set_mode(configuration.mode)
    }

    /// Reads the raw ADC codes for all three channels.
    pub fn read_raw_sample(&mut self) -> RawSample {
        RawSample {
            temperature: self.read_raw_temperature(),
            pressure: self.read_raw_pressure(),
            humidity: self.read_raw_humidity(),
        }
    }

    /// Reads and compensates the temperature, in degrees Celsius.
    ///
    /// Before a successful [`initialize`](Bme280::initialize) this (and
    /// the other measurement reads) return 0.0.
    pub fn read_temperature_c(&mut self) -> f32 {
        let adc_t = self.read_raw_temperature() as i32;
        match &self.calibration {
            Some(calib) => compensate_temperature(adc_t, calib).1,
            None => 0.0,
        }
    }

    /// Reads and compensates the pressure, in Pascals.
    ///
    /// Runs a temperature compensation first to obtain the fine
    /// temperature the pressure formula needs. Returns the 0.0 sentinel
    /// for the degenerate calibration case.
    pub fn read_pressure_pa(&mut self) -> f32 {
        let adc_t = self.read_raw_temperature() as i32;
        let adc_p = self.read_raw_pressure() as i32;
        match &self.calibration {
            Some(calib) => {
                let (t_fine, _) = compensate_temperature(adc_t, calib);
                compensate_pressure(adc_p, t_fine, calib)
            }
            None => 0.0,
        }
    }

    /// Reads and compensates the relative humidity, in percent.
    ///
    /// Runs a temperature compensation first, like
    /// [`read_pressure_pa`](Bme280::read_pressure_pa).
    pub fn read_humidity_percent(&mut self) -> f32 {
        let adc_t = self.read_raw_temperature() as i32;
        let adc_h = self.read_raw_humidity() as i32;
        match &self.calibration {
            Some(calib) => {
                let (t_fine, _) = compensate_temperature(adc_t, calib);
                compensate_humidity(adc_h, t_fine, calib)
            }
            None => 0.0,
        }
    }

    /// Estimates altitude in meters from the current pressure reading and
    /// the sea-level reference pressure in hPa, via the standard
    /// barometric formula.
    pub fn read_altitude_m(&mut self, sea_level_hpa: f32) -> f32 {
        let pressure_hpa = self.read_pressure_pa() / 100.0;
        44_330.0 * (1.0 - (pressure_hpa / sea_level_hpa).powf(0.1903))
    }

    fn load_calibration(&mut self) -> Result<(), Error<E>> {
        let mut tp = [0u8; CALIB_00_LEN];
        self.read_block(REG_CALIB_00, &mut tp)?;
        let mut h = [0u8; CALIB_26_LEN];
        self.read_block(REG_CALIB_26, &mut h)?;
        self.calibration = Some(CalibrationData::from_blocks(&tp, &h));
        debug!("calibration loaded: {:?}", self.calibration);
        Ok(())
    }

    fn read_raw_temperature(&mut self) -> u32 {
        let msb = self.read_register(REG_TEMP_MSB) as u32;
        let lsb = self.read_register(REG_TEMP_LSB) as u32;
        let xlsb = self.read_register(REG_TEMP_XLSB) as u32;
        (msb << 12) | (lsb << 4) | (xlsb >> 4)
    }

    fn read_raw_pressure(&mut self) -> u32 {
        let msb = self.read_register(REG_PRESS_MSB) as u32;
        let lsb = self.read_register(REG_PRESS_LSB) as u32;
        let xlsb = self.read_register(REG_PRESS_XLSB) as u32;
        (msb << 12) | (lsb << 4) | (xlsb >> 4)
    }

    fn read_raw_humidity(&mut self) -> u16 {
        let msb = self.read_register(REG_HUM_MSB) as u16;
        let lsb = self.read_register(REG_HUM_LSB) as u16;
        (msb << 8) | lsb
    }

    /// Reads a single register, degrading a transport failure to 0x00
    /// (the sensor's "no reading available" convention).
    ///
    /// A genuinely failed read is indistinguishable from a register that
    /// holds zero (e.g. sleep mode reads the same); the warning log is
    /// the only trace. Kept for compatibility with the existing register
    /// contract; calibration goes through [`read_block`] instead so those
    /// failures do surface.
    fn read_register(&mut self, reg: u8) -> u8 {
        let mut buf = [0u8; 1];
        match self.i2c.write_read(self.address, &[reg], &mut buf) {
            Ok(()) => buf[0],
            Err(_) => {
                warn!("read of register 0x{:02X} failed, reporting 0x00", reg);
                0
            }
        }
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Error::WriteFailure)?;
        // the part wants a moment before the next transaction lands
        self.delay.delay_ms(1);
        Ok(())
    }

    fn read_block(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c
            .write_read(self.address, &[reg], buffer)
            .map_err(Error::ReadFailure)
    }
}
