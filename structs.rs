use crate::{CALIB_00_LEN, CALIB_26_LEN};

/// Factory calibration coefficients, at the widths the device stores them.
///
/// Read once during initialization and immutable afterwards; the driver
/// reloads them on every [`initialize`](crate::Bme280::initialize).
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationData {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl CalibrationData {
    /// Parses the two calibration blocks (registers 0x88..=0xA1 and
    /// 0xE1..=0xE7).
    ///
    /// T1 and P1 are unsigned little-endian 16-bit, the remaining T/P
    /// coefficients signed little-endian 16-bit. Byte 24 of the first
    /// block is a filler register; H1 follows it. H4 and H5 are 12-bit
    /// values nibble-packed across bytes e4/e5/e6 of the second block:
    /// the low nibble of e5 belongs to H4, the high nibble to H5.
    pub fn from_blocks(tp: &[u8; CALIB_00_LEN], h: &[u8; CALIB_26_LEN]) -> Self {
        CalibrationData {
            dig_t1: u16::from_le_bytes([tp[0], tp[1]]),
            dig_t2: i16::from_le_bytes([tp[2], tp[3]]),
            dig_t3: i16::from_le_bytes([tp[4], tp[5]]),
            dig_p1: u16::from_le_bytes([tp[6], tp[7]]),
            dig_p2: i16::from_le_bytes([tp[8], tp[9]]),
            dig_p3: i16::from_le_bytes([tp[10], tp[11]]),
            dig_p4: i16::from_le_bytes([tp[12], tp[13]]),
            dig_p5: i16::from_le_bytes([tp[14], tp[15]]),
            dig_p6: i16::from_le_bytes([tp[16], tp[17]]),
            dig_p7: i16::from_le_bytes([tp[18], tp[19]]),
            dig_p8: i16::from_le_bytes([tp[20], tp[21]]),
            dig_p9: i16::from_le_bytes([tp[22], tp[23]]),
            // tp[24] is the 0xA0 filler register
            dig_h1: tp[25],
            dig_h2: i16::from_le_bytes([h[0], h[1]]),
            dig_h3: h[2],
            dig_h4: ((h[3] as i16) << 4) | (h[4] & 0x0F) as i16,
            dig_h5: ((h[5] as i16) << 4) | (h[4] >> 4) as i16,
            dig_h6: h[6] as i8,
        }
    }
}

/// One set of uncompensated ADC codes: 20-bit temperature and pressure,
/// 16-bit humidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub temperature: u32,
    pub pressure: u32,
    pub humidity: u16,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::CalibrationData;

    // Bosch datasheet worked-example coefficients, serialized the way the
    // device lays them out.
    pub(crate) const TP_BLOCK: [u8; 26] = [
        0x70, 0x6B, // T1 = 27504
        0x43, 0x67, // T2 = 26435
        0x18, 0xFC, // T3 = -1000
        0x7D, 0x8E, // P1 = 36477
        0x43, 0xD6, // P2 = -10685
        0xD0, 0x0B, // P3 = 3024
        0x27, 0x0B, // P4 = 2855
        0x8C, 0x00, // P5 = 140
        0xF9, 0xFF, // P6 = -7
        0x8C, 0x3C, // P7 = 15500
        0xF8, 0xC6, // P8 = -14600
        0x70, 0x17, // P9 = 6000
        0x00, // 0xA0 filler
        0x4B, // H1 = 75
    ];
    pub(crate) const H_BLOCK: [u8; 7] = [
        0x5E, 0x01, // H2 = 350
        0x00, // H3 = 0
        0x13, 0x2C, 0x03, // e4/e5/e6 -> H4 = 316, H5 = 50
        0x1E, // H6 = 30
    ];

    pub(crate) fn datasheet_calibration() -> CalibrationData {
        CalibrationData::from_blocks(&TP_BLOCK, &H_BLOCK)
    }

    #[test]
    fn parses_datasheet_coefficients() {
        let calib = datasheet_calibration();
        assert_eq!(calib.dig_t1, 27504);
        assert_eq!(calib.dig_t2, 26435);
        assert_eq!(calib.dig_t3, -1000);
        assert_eq!(calib.dig_p1, 36477);
        assert_eq!(calib.dig_p2, -10685);
        assert_eq!(calib.dig_p3, 3024);
        assert_eq!(calib.dig_p4, 2855);
        assert_eq!(calib.dig_p5, 140);
        assert_eq!(calib.dig_p6, -7);
        assert_eq!(calib.dig_p7, 15500);
        assert_eq!(calib.dig_p8, -14600);
        assert_eq!(calib.dig_p9, 6000);
        assert_eq!(calib.dig_h1, 75);
        assert_eq!(calib.dig_h2, 350);
        assert_eq!(calib.dig_h3, 0);
        assert_eq!(calib.dig_h4, 316);
        assert_eq!(calib.dig_h5, 50);
        assert_eq!(calib.dig_h6, 30);
    }

    #[test]
    fn h4_h5_nibble_packing() {
        // e5's low nibble goes to H4, its high nibble to H5. Asymmetric
        // values so a swapped nibble shows up.
        let mut h = [0u8; 7];
        h[3] = 0xAB; // e4
        h[4] = 0xC5; // e5
        h[5] = 0xDE; // e6
        let calib = CalibrationData::from_blocks(&[0u8; 26], &h);
        assert_eq!(calib.dig_h4, 0xAB5);
        assert_eq!(calib.dig_h5, 0xDEC);
    }

    #[test]
    fn h6_is_sign_extended() {
        let mut h = [0u8; 7];
        h[6] = 0xFF;
        let calib = CalibrationData::from_blocks(&[0u8; 26], &h);
        assert_eq!(calib.dig_h6, -1);
    }
}
