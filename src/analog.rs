//! TI ADS1018 12-bit ADC with internal temperature sensor.

use bitflags::bitflags;
use log::trace;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::thread;
use std::time::Duration;

use crate::Result;

const SPI_CLOCK: u32 = 1_000_000;
/// Time for the first conversion after a configuration change, at the slowest data rate.
const SETTLE: Duration = Duration::from_millis(15);
/// Celsius per LSB of the temperature result.
const TEMPERATURE_LSB: f32 = 0.125;

const MUX_SHIFT: u16 = 12;
const PGA_SHIFT: u16 = 9;
const DR_SHIFT: u16 = 5;
const MUX_MASK: u16 = 0b111 << MUX_SHIFT;

bitflags! {
	/// Single bit fields of the 16-bit config register.
	#[derive(Copy, Clone, Debug, PartialEq, Eq)]
	pub struct ConfigFlags: u16 {
		/// Start a single-shot conversion.
		const START = 1 << 15;
		const SINGLE_SHOT = 1 << 8;
		/// Convert the internal temperature sensor instead of the input mux.
		const TEMPERATURE = 1 << 4;
		const PULL_UP = 1 << 3;
		/// Marks the write as a configuration update.
		const NOP_VALID = 1 << 1;
		const RESERVED = 1 << 0;
	}
}

/// Input multiplexer setting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
	Single1 = 0b100,
	Single2 = 0b101,
	Single3 = 0b110,
	Single4 = 0b111,
	Differential1_2 = 0b000,
	Differential3_4 = 0b011,
}

/// Full scale range of the programmable gain amplifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gain {
	Fsr4_096 = 0b001,
	Fsr2_048 = 0b010,
	Fsr1_024 = 0b011,
	Fsr0_512 = 0b100,
	Fsr0_256 = 0b101,
}

impl Gain {
	/// Full scale range in volts.
	pub fn full_scale(&self) -> f32 {
		match self {
			Gain::Fsr4_096 => 4.096,
			Gain::Fsr2_048 => 2.048,
			Gain::Fsr1_024 => 1.024,
			Gain::Fsr0_512 => 0.512,
			Gain::Fsr0_256 => 0.256,
		}
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConversionMode {
	Continuous,
	SingleShot,
}

/// Samples per second.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataRate {
	Sps128 = 0b000,
	Sps250 = 0b001,
	Sps490 = 0b010,
	Sps920 = 0b011,
	Sps1600 = 0b100,
	Sps2400 = 0b101,
	Sps3300 = 0b110,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemperatureUnit {
	Celsius,
	Fahrenheit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdcConfig {
	pub channel: Channel,
	pub gain: Gain,
	pub mode: ConversionMode,
	pub data_rate: DataRate,
}

impl Default for AdcConfig {
	fn default() -> AdcConfig {
		AdcConfig {
			channel: Channel::Single1,
			gain: Gain::Fsr4_096,
			mode: ConversionMode::Continuous,
			data_rate: DataRate::Sps250,
		}
	}
}

impl AdcConfig {
	/// Config register value for this configuration, with the pull-up enabled.
	pub fn register(&self) -> u16 {
		let mut flags = ConfigFlags::PULL_UP | ConfigFlags::NOP_VALID | ConfigFlags::RESERVED;
		if self.mode == ConversionMode::SingleShot {
			flags |= ConfigFlags::SINGLE_SHOT;
		}
		(self.channel as u16) << MUX_SHIFT
			| (self.gain as u16) << PGA_SHIFT
			| (self.data_rate as u16) << DR_SHIFT
			| flags.bits()
	}
}

/// Full duplex 16-bit exchange with the converter.
pub trait SpiTransfer {
	/// Clocks out `write` while clocking in the previous conversion result.
	fn transfer(&mut self, write: [u8; 2]) -> Result<[u8; 2]>;

	fn delay(&mut self, duration: Duration) {
		thread::sleep(duration);
	}
}

impl SpiTransfer for Spi {
	fn transfer(&mut self, write: [u8; 2]) -> Result<[u8; 2]> {
		let mut read = [0u8; 2];
		Spi::transfer(self, &mut read, &write)?;
		trace!("spi {:02X?} -> {:02X?}", write, read);
		Ok(read)
	}
}

/// Left-justified 12-bit two's complement result to a signed count.
fn conversion(read: [u8; 2]) -> i16 {
	i16::from_be_bytes(read) >> 4
}

pub struct Ads1018<S: SpiTransfer = Spi> {
	spi: S,
	register: u16,
	channel: Channel,
}

impl Ads1018<Spi> {
	/// Opens SPI0 CE0 and applies [`AdcConfig::default`].
	pub fn open() -> Result<Ads1018<Spi>> {
		let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK, Mode::Mode1)?;
		Ads1018::new(spi, AdcConfig::default())
	}
}

impl<S: SpiTransfer> Ads1018<S> {
	pub fn new(spi: S, config: AdcConfig) -> Result<Ads1018<S>> {
		let mut adc = Ads1018 { spi, register: 0, channel: config.channel };
		adc.configure(config)?;
		Ok(adc)
	}

	/// Writes `config` and waits for the first conversion.
	pub fn configure(&mut self, config: AdcConfig) -> Result<()> {
		self.register = config.register();
		self.channel = config.channel;
		self.write_register()?;
		self.spi.delay(SETTLE);
		Ok(())
	}

	fn write_register(&mut self) -> Result<[u8; 2]> {
		self.spi.transfer(self.register.to_be_bytes())
	}

	/// Converts `channel`. Switching channels costs one extra conversion time.
	pub fn read(&mut self, channel: Channel) -> Result<i16> {
		self.register &= !(MUX_MASK | ConfigFlags::TEMPERATURE.bits());
		self.register |= ConfigFlags::START.bits() | (channel as u16) << MUX_SHIFT;
		if self.channel != channel {
			self.write_register()?;
			self.channel = channel;
			self.spi.delay(SETTLE);
		}
		Ok(conversion(self.write_register()?))
	}

	/// Internal die temperature.
	pub fn read_temperature(&mut self, unit: TemperatureUnit) -> Result<f32> {
		self.register |= ConfigFlags::TEMPERATURE.bits();
		self.write_register()?;
		self.spi.delay(SETTLE);
		let raw = conversion(self.write_register()?);
		self.register &= !ConfigFlags::TEMPERATURE.bits();
		self.write_register()?;

		let celsius = raw as f32 * TEMPERATURE_LSB;
		Ok(match unit {
			TemperatureUnit::Celsius => celsius,
			TemperatureUnit::Fahrenheit => celsius * 1.8 + 32.0,
		})
	}

	pub fn into_inner(self) -> S {
		self.spi
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::VecDeque;

	#[derive(Default)]
	struct FakeSpi {
		written: Vec<u16>,
		results: VecDeque<[u8; 2]>,
		delays: usize,
	}

	impl SpiTransfer for FakeSpi {
		fn transfer(&mut self, write: [u8; 2]) -> Result<[u8; 2]> {
			self.written.push(u16::from_be_bytes(write));
			Ok(self.results.pop_front().unwrap_or_default())
		}

		fn delay(&mut self, _: Duration) {
			self.delays += 1;
		}
	}

	fn fake_adc(results: &[[u8; 2]]) -> Ads1018<FakeSpi> {
		let mut adc = Ads1018::new(FakeSpi::default(), AdcConfig::default()).unwrap();
		adc.spi.written.clear();
		adc.spi.delays = 0;
		adc.spi.results.extend(results);
		adc
	}

	#[test]
	fn default_register_layout() {
		// MUX 100, PGA 001, continuous, 250 SPS, pull-up, NOP valid
		assert_eq!(AdcConfig::default().register(), 0x422B);
		let config = AdcConfig { mode: ConversionMode::SingleShot, data_rate: DataRate::Sps3300, ..AdcConfig::default() };
		assert_eq!(config.register(), 0x43CB);
	}

	#[test]
	fn configure_writes_once_and_waits() {
		let adc = Ads1018::new(FakeSpi::default(), AdcConfig::default()).unwrap();
		assert_eq!(adc.spi.written, vec![0x422B]);
		assert_eq!(adc.spi.delays, 1);
	}

	#[test]
	fn same_channel_reads_in_one_transfer() {
		let mut adc = fake_adc(&[[0x7F, 0xF0]]);
		assert_eq!(adc.read(Channel::Single1).unwrap(), 2047);
		assert_eq!(adc.spi.written, vec![0xC22B]);
		assert_eq!(adc.spi.delays, 0);
	}

	#[test]
	fn channel_change_costs_a_conversion() {
		let mut adc = fake_adc(&[[0, 0], [0x12, 0x30]]);
		assert_eq!(adc.read(Channel::Differential3_4).unwrap(), 0x123);
		assert_eq!(adc.spi.written, vec![0xB22B, 0xB22B]);
		assert_eq!(adc.spi.delays, 1);
		assert_eq!(adc.channel, Channel::Differential3_4);
	}

	#[test]
	fn negative_differential_reading_is_sign_extended() {
		let mut adc = fake_adc(&[[0, 0], [0xFF, 0xF0]]);
		assert_eq!(adc.read(Channel::Differential1_2).unwrap(), -1);
		let mut adc = fake_adc(&[[0x80, 0x00]]);
		assert_eq!(adc.read(Channel::Single1).unwrap(), -2048);
	}

	#[test]
	fn temperature_toggles_sensor_mode() {
		// 25 C = 200 LSB
		let mut adc = fake_adc(&[[0, 0], [0x0C, 0x80], [0, 0]]);
		assert_eq!(adc.read_temperature(TemperatureUnit::Celsius).unwrap(), 25.0);
		assert_eq!(adc.spi.written, vec![0x423B, 0x423B, 0x422B]);

		let mut adc = fake_adc(&[[0, 0], [0x0C, 0x80], [0, 0]]);
		let fahrenheit = adc.read_temperature(TemperatureUnit::Fahrenheit).unwrap();
		assert!((fahrenheit - 77.0).abs() < 1e-4);
	}

	#[test]
	fn below_zero_temperature() {
		// -10 C = -80 LSB = 0xFB0 in 12 bits
		let mut adc = fake_adc(&[[0, 0], [0xFB, 0x00], [0, 0]]);
		assert_eq!(adc.read_temperature(TemperatureUnit::Celsius).unwrap(), -10.0);
	}

	#[test]
	fn gain_full_scale() {
		assert_eq!(Gain::Fsr0_256.full_scale(), 0.256);
	}
}
