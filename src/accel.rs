//! NXP MMA8491Q 3-axis accelerometer with tilt outputs.
//!
//! The sensor only runs while its enable line is high: every read raises it, waits for
//! the measurement and lowers it again, so the part draws nothing between samples.

use log::trace;
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::i2c::I2c;
use std::thread;
use std::time::Duration;

use crate::Result;

const I2C_BUS: u8 = 1;
const ADDRESS: u16 = 0x55;
const REG_STATUS: u8 = 0x00;
/// Enable to data ready.
const ON_TIME: Duration = Duration::from_millis(1);
const COUNTS_PER_G: f32 = 1024.0;

/// BCM numbers of the lines the sensor is wired to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AccelPins {
	pub enable: u8,
	pub tilt_x: u8,
	pub tilt_y: u8,
	pub tilt_z: u8,
}

impl Default for AccelPins {
	fn default() -> AccelPins {
		AccelPins { enable: 26, tilt_x: 13, tilt_y: 19, tilt_z: 6 }
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
	Z,
}

/// One 14-bit left-justified output register pair to g.
fn axis_g(msb: u8, lsb: u8) -> f32 {
	(i16::from_be_bytes([msb, lsb]) >> 2) as f32 / COUNTS_PER_G
}

/// STATUS followed by the X, Y and Z output registers to g.
fn sample_to_g(sample: &[u8; 7]) -> [f32; 3] {
	[axis_g(sample[1], sample[2]), axis_g(sample[3], sample[4]), axis_g(sample[5], sample[6])]
}

pub struct Mma8491q {
	i2c: I2c,
	enable: OutputPin,
	tilt: [InputPin; 3],
}

impl Mma8491q {
	pub fn open() -> Result<Mma8491q> {
		Mma8491q::new(AccelPins::default())
	}

	pub fn new(pins: AccelPins) -> Result<Mma8491q> {
		let gpio = Gpio::new()?;
		let enable = gpio.get(pins.enable)?.into_output_low();
		let tilt = [
			gpio.get(pins.tilt_x)?.into_input(),
			gpio.get(pins.tilt_y)?.into_input(),
			gpio.get(pins.tilt_z)?.into_input(),
		];
		let mut i2c = I2c::with_bus(I2C_BUS)?;
		i2c.set_slave_address(ADDRESS)?;
		Ok(Mma8491q { i2c, enable, tilt })
	}

	/// Runs `sample` inside one enable cycle. The enable line is lowered even if sampling fails.
	fn cycle<V>(&mut self, sample: impl FnOnce(&mut Mma8491q) -> Result<V>) -> Result<V> {
		self.enable.set_high();
		thread::sleep(ON_TIME);
		let value = sample(self);
		self.enable.set_low();
		value
	}

	/// Acceleration on X, Y and Z in g.
	pub fn read_accel_xyz(&mut self) -> Result<[f32; 3]> {
		self.cycle(|accel| {
			let mut sample = [0u8; 7];
			accel.i2c.write_read(&[REG_STATUS], &mut sample)?;
			trace!("mma8491q {:02X?}", sample);
			Ok(sample_to_g(&sample))
		})
	}

	pub fn read_accel(&mut self, axis: Axis) -> Result<f32> {
		Ok(self.read_accel_xyz()?[axis as usize])
	}

	/// Tilt outputs; each goes high when its axis sees more than 0.688 g.
	pub fn read_tilt_xyz(&mut self) -> Result<[bool; 3]> {
		self.cycle(|accel| Ok([accel.tilt[0].is_high(), accel.tilt[1].is_high(), accel.tilt[2].is_high()]))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn one_g_is_1024_counts() {
		// 1024 << 2
		assert_eq!(axis_g(0x10, 0x00), 1.0);
		assert_eq!(axis_g(0xF0, 0x00), -1.0);
		assert_eq!(axis_g(0x00, 0x00), 0.0);
	}

	#[test]
	fn low_two_bits_are_ignored() {
		assert_eq!(axis_g(0x10, 0x03), 1.0);
		assert_eq!(axis_g(0x00, 0x04), 1.0 / 1024.0);
	}

	#[test]
	fn full_scale_is_8g() {
		assert!((axis_g(0x7F, 0xFC) - 7.999).abs() < 1e-3);
		assert_eq!(axis_g(0x80, 0x00), -8.0);
	}

	#[test]
	fn sample_skips_status_byte() {
		let sample = [0x0F, 0x10, 0x00, 0x00, 0x00, 0xF0, 0x00];
		assert_eq!(sample_to_g(&sample), [1.0, 0.0, -1.0]);
	}

	#[test]
	fn axis_indexes_sample_order() {
		assert_eq!([Axis::X as usize, Axis::Y as usize, Axis::Z as usize], [0, 1, 2]);
	}
}
