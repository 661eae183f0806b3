//! Operating configuration: power mode, per-channel oversampling, IIR
//! filter and standby interval, mirrored across the CTRL_MEAS, CTRL_HUM
//! and CONFIG registers.

// Bit fields inside CTRL_MEAS.
pub(crate) const MODE_MASK: u8 = 0b0000_0011;
pub(crate) const OSRS_P_MASK: u8 = 0b0001_1100;
pub(crate) const OSRS_T_MASK: u8 = 0b1110_0000;

// CTRL_HUM only carries the humidity oversampling in its low 3 bits.
pub(crate) const OSRS_H_MASK: u8 = 0b0000_0111;

// Bit fields inside CONFIG.
pub(crate) const FILTER_MASK: u8 = 0b0001_1100;
pub(crate) const STANDBY_MASK: u8 = 0b1110_0000;

/// Power mode (CTRL_MEAS bits 0-1).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sleep = 0b00,
    Forced = 0b01,
    Normal = 0b11,
}

impl Mode {
    /// Decodes the mode field. The device treats both 0b01 and 0b10 as
    /// forced mode.
    pub fn from_bits(bits: u8) -> Self {
        match bits & MODE_MASK {
            0b00 => Mode::Sleep,
            0b01 | 0b10 => Mode::Forced,
            _ => Mode::Normal,
        }
    }
}

/// Oversampling factor for one channel.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oversampling {
    Skip = 0b000,
    X1 = 0b001,
    X2 = 0b010,
    X4 = 0b011,
    X8 = 0b100,
    X16 = 0b101,
}

impl Oversampling {
    /// Decodes a 3-bit oversampling field; the device maps the two spare
    /// codes to 16x.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Oversampling::Skip,
            0b001 => Oversampling::X1,
            0b010 => Oversampling::X2,
            0b011 => Oversampling::X4,
            0b100 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }
}

/// IIR filter coefficient (CONFIG bits 2-4).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Off = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
}

impl Filter {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Filter::Off,
            0b001 => Filter::X2,
            0b010 => Filter::X4,
            0b011 => Filter::X8,
            _ => Filter::X16,
        }
    }
}

/// Standby interval between measurement cycles in normal mode
/// (CONFIG bits 5-7).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandbyTime {
    Ms0_5 = 0b000,
    Ms62_5 = 0b001,
    Ms125 = 0b010,
    Ms250 = 0b011,
    Ms500 = 0b100,
    Ms1000 = 0b101,
    Ms10 = 0b110,
    Ms20 = 0b111,
}

impl StandbyTime {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => StandbyTime::Ms0_5,
            0b001 => StandbyTime::Ms62_5,
            0b010 => StandbyTime::Ms125,
            0b011 => StandbyTime::Ms250,
            0b100 => StandbyTime::Ms500,
            0b101 => StandbyTime::Ms1000,
            0b110 => StandbyTime::Ms10,
            _ => StandbyTime::Ms20,
        }
    }
}

// Each register update is a pure (old byte, field) -> new byte function so
// the masking can be checked without a bus.

/// Replaces the mode field of a CTRL_MEAS byte.
pub fn with_mode(ctrl_meas: u8, mode: Mode) -> u8 {
    (ctrl_meas & !MODE_MASK) | (mode as u8)
}

/// Replaces the temperature oversampling field of a CTRL_MEAS byte.
pub fn with_oversampling_temperature(ctrl_meas: u8, oversampling: Oversampling) -> u8 {
    (ctrl_meas & !OSRS_T_MASK) | ((oversampling as u8) << 5)
}

/// Replaces the pressure oversampling field of a CTRL_MEAS byte.
pub fn with_oversampling_pressure(ctrl_meas: u8, oversampling: Oversampling) -> u8 {
    (ctrl_meas & !OSRS_P_MASK) | ((oversampling as u8) << 2)
}

/// Replaces the filter field of a CONFIG byte.
pub fn with_filter(config: u8, filter: Filter) -> u8 {
    (config & !FILTER_MASK) | ((filter as u8) << 2)
}

/// Replaces the standby field of a CONFIG byte.
pub fn with_standby_time(config: u8, standby: StandbyTime) -> u8 {
    (config & !STANDBY_MASK) | ((standby as u8) << 5)
}

/// Snapshot of the three configuration registers.
///
/// The default matches the configuration applied at the end of
/// [`initialize`](crate::Bme280::initialize): 16x oversampling on every
/// channel, filter coefficient 16, 0.5 ms standby, normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub mode: Mode,
    pub oversampling_temperature: Oversampling,
    pub oversampling_pressure: Oversampling,
    pub oversampling_humidity: Oversampling,
    pub filter: Filter,
    pub standby_time: StandbyTime,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            mode: Mode::Normal,
            oversampling_temperature: Oversampling::X16,
            oversampling_pressure: Oversampling::X16,
            oversampling_humidity: Oversampling::X16,
            filter: Filter::X16,
            standby_time: StandbyTime::Ms0_5,
        }
    }
}
