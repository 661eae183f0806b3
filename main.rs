use rppal::hal::Delay;
use rppal::i2c::I2c;

use bme280_rpi::Bme280;

// Mean sea-level pressure in hPa, for the altitude estimate.
const SEA_LEVEL_HPA: f32 = 1013.25;

fn main() {
    let i2c = I2c::new();
    if let Ok(i2c) = i2c {
        let mut sensor = Bme280::new(i2c, Delay::new());
        match sensor.initialize() {
            Ok(()) => {
                let t = sensor.read_temperature_c();
                println!("Temperature: {:.2} C", t);
                let h = sensor.read_humidity_percent();
                println!("Humidity: {:.2} %", h);
                let p = sensor.read_pressure_pa();
                println!("Pressure: {:.2} hPa", p / 100.0);
                let a = sensor.read_altitude_m(SEA_LEVEL_HPA);
                println!("Altitude: {:.1} m", a);
            }
            Err(e) => eprintln!("BME280 initialization failed: {:?}", e),
        }
    } else {
        eprintln!("could not open the I2C bus");
    }
}
