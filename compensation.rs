//! Fixed-point compensation formulas from the BME280 datasheet (§4.2.3 /
//! §8). Temperature runs in 32-bit signed arithmetic that wraps as two's
//! complement, pressure in 64-bit signed arithmetic, humidity in 32-bit
//! signed wrapping arithmetic with a device-defined saturation clamp.

use crate::structs::CalibrationData;

/// Calibrated but not yet unit-scaled temperature, produced by
/// [`compensate_temperature`] and consumed by the pressure and humidity
/// formulas. Making it an explicit value (instead of hidden driver state)
/// forces callers to run temperature compensation first in each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineTemperature(pub(crate) i32);

/// Converts a raw 20-bit temperature ADC code to degrees Celsius,
/// returning the fine-temperature intermediate alongside the result.
pub fn compensate_temperature(adc_t: i32, calib: &CalibrationData) -> (FineTemperature, f32) {
    let t1 = calib.dig_t1 as i32;
    let t2 = calib.dig_t2 as i32;
    let t3 = calib.dig_t3 as i32;

    let var1 = ((adc_t >> 3).wrapping_sub(t1 << 1)).wrapping_mul(t2) >> 11;
    let delta = (adc_t >> 4).wrapping_sub(t1);
    let var2 = ((delta.wrapping_mul(delta) >> 12).wrapping_mul(t3)) >> 14;
    let t_fine = var1.wrapping_add(var2);

    let centi = (t_fine.wrapping_mul(5).wrapping_add(128)) >> 8;
    (FineTemperature(t_fine), centi as f32 / 100.0)
}

/// Converts a raw 20-bit pressure ADC code to Pascals.
///
/// Returns exactly 0.0 when the scaled `var1` denominator is zero (the
/// device's "invalid reading" sentinel, avoiding a division by zero).
pub fn compensate_pressure(adc_p: i32, t_fine: FineTemperature, calib: &CalibrationData) -> f32 {
    let mut var1 = t_fine.0 as i64 - 128_000;
    let mut var2 = var1 * var1 * calib.dig_p6 as i64;
    var2 += (var1 * calib.dig_p5 as i64) << 17;
    var2 += (calib.dig_p4 as i64) << 35;
    var1 = ((var1 * var1 * calib.dig_p3 as i64) >> 8) + ((var1 * calib.dig_p2 as i64) << 12);
    var1 = (((1i64 << 47) + var1) * calib.dig_p1 as i64) >> 33;
    if var1 == 0 {
        return 0.0;
    }

    let mut p = 1_048_576 - adc_p as i64;
    p = ((p << 31) - var2) * 3125 / var1;
    var1 = (calib.dig_p9 as i64 * (p >> 13) * (p >> 13)) >> 25;
    var2 = (calib.dig_p8 as i64 * p) >> 19;
    p = ((p + var1 + var2) >> 8) + ((calib.dig_p7 as i64) << 4);

    // p is the pressure in Q24.8
    p as f32 / 256.0
}

/// Converts a raw 16-bit humidity ADC code to percent relative humidity.
///
/// The intermediate is clamped to `[0, 419430400]` before scaling, so the
/// result never leaves `[0.0, 100.0]`.
pub fn compensate_humidity(adc_h: i32, t_fine: FineTemperature, calib: &CalibrationData) -> f32 {
    let h1 = calib.dig_h1 as i32;
    let h2 = calib.dig_h2 as i32;
    let h3 = calib.dig_h3 as i32;
    let h4 = calib.dig_h4 as i32;
    let h5 = calib.dig_h5 as i32;
    let h6 = calib.dig_h6 as i32;

    let v = t_fine.0.wrapping_sub(76_800);
    let lhs = (adc_h << 14)
        .wrapping_sub(h4 << 20)
        .wrapping_sub(h5.wrapping_mul(v))
        .wrapping_add(16_384)
        >> 15;
    let rhs = ((v.wrapping_mul(h6) >> 10)
        .wrapping_mul((v.wrapping_mul(h3) >> 11).wrapping_add(32_768))
        >> 10)
        .wrapping_add(2_097_152)
        .wrapping_mul(h2)
        .wrapping_add(8_192)
        >> 14;
    let mut v = lhs.wrapping_mul(rhs);
    v = v.wrapping_sub(((v >> 15).wrapping_mul(v >> 15) >> 7).wrapping_mul(h1) >> 4);

    if v < 0 {
        v = 0;
    }
    if v > 419_430_400 {
        v = 419_430_400;
    }
    (v >> 12) as f32 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::tests::datasheet_calibration;
    use crate::structs::CalibrationData;

    // Raw ADC codes paired with the datasheet coefficients in structs.rs.
    const ADC_T: i32 = 519_888;
    const ADC_P: i32 = 415_148;
    const ADC_H: i32 = 30_000;

    #[test]
    fn temperature_matches_datasheet_worked_example() {
        let calib = datasheet_calibration();
        let (t_fine, celsius) = compensate_temperature(ADC_T, &calib);
        assert_eq!(t_fine, FineTemperature(128_422));
        assert!((celsius - 25.08).abs() < 1e-2);
    }

    #[test]
    fn temperature_is_idempotent_and_bit_identical() {
        let calib = datasheet_calibration();
        let (fine_a, temp_a) = compensate_temperature(ADC_T, &calib);
        let (fine_b, temp_b) = compensate_temperature(ADC_T, &calib);
        assert_eq!(fine_a, fine_b);
        assert_eq!(temp_a.to_bits(), temp_b.to_bits());
    }

    #[test]
    fn pressure_matches_datasheet_worked_example() {
        let calib = datasheet_calibration();
        let (t_fine, _) = compensate_temperature(ADC_T, &calib);
        let pascals = compensate_pressure(ADC_P, t_fine, &calib);
        // 25767233 >> 8 in Q24.8; the datasheet's double-precision
        // reference value is 100653.27 Pa.
        assert!((pascals - 100_653.25).abs() < 0.05);
    }

    #[test]
    fn pressure_returns_zero_sentinel_when_var1_vanishes() {
        // dig_p1 scales the whole denominator, so zeroing it forces the
        // degenerate case regardless of t_fine.
        let mut calib = datasheet_calibration();
        calib.dig_p1 = 0;
        let (t_fine, _) = compensate_temperature(ADC_T, &calib);
        assert_eq!(compensate_pressure(ADC_P, t_fine, &calib), 0.0);
    }

    #[test]
    fn humidity_matches_reference_value() {
        let calib = datasheet_calibration();
        let (t_fine, _) = compensate_temperature(ADC_T, &calib);
        let humidity = compensate_humidity(ADC_H, t_fine, &calib);
        assert!((humidity - 52.155_273).abs() < 1e-3);
    }

    #[test]
    fn humidity_never_leaves_saturation_bounds() {
        let extreme = CalibrationData {
            dig_t1: u16::max_value(),
            dig_t2: i16::min_value(),
            dig_t3: i16::max_value(),
            dig_p1: u16::max_value(),
            dig_p2: i16::min_value(),
            dig_p3: i16::max_value(),
            dig_p4: i16::min_value(),
            dig_p5: i16::max_value(),
            dig_p6: i16::min_value(),
            dig_p7: i16::max_value(),
            dig_p8: i16::min_value(),
            dig_p9: i16::max_value(),
            dig_h1: u8::max_value(),
            dig_h2: i16::min_value(),
            dig_h3: u8::max_value(),
            dig_h4: i16::max_value(),
            dig_h5: i16::min_value(),
            dig_h6: i8::min_value(),
        };
        let zeroed = CalibrationData::from_blocks(&[0u8; 26], &[0u8; 7]);
        for calib in &[datasheet_calibration(), extreme, zeroed] {
            for &adc_t in &[0i32, 1, 0x7_FFFF, 0xF_FFFF] {
                let (t_fine, _) = compensate_temperature(adc_t, calib);
                for &adc_h in &[0i32, 1, 0x8000, 0xFFFF] {
                    let humidity = compensate_humidity(adc_h, t_fine, calib);
                    assert!(
                        (0.0..=100.0).contains(&humidity),
                        "humidity {} out of range for adc_t={} adc_h={}",
                        humidity,
                        adc_t,
                        adc_h
                    );
                }
            }
        }
    }
}
