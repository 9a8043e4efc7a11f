use std::path::PathBuf;
use std::time::Duration;

use super::params::{AutoConfig, Region};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
	/// Serial device the module is wired to. The HAT uses the Pi's primary UART.
	pub port: PathBuf,
	pub baud_rate: u32,
	/// Read timeout for a single reply line. Writes block until the line is sent.
	pub timeout: Duration,
	pub region: Region,
	pub auto_config: AutoConfig,
	/// Radio frequency in Hz used by the auto modes on an RN2903.
	pub freq_us: u32,
	/// Radio frequency in Hz used by the auto modes on an RN2483.
	pub freq_eu: u32,
}

impl Config {
	/// Auto mode frequency for the configured region.
	pub fn frequency(&self) -> u32 {
		match self.region {
			Region::UsRn2903 => self.freq_us,
			Region::EuRn2483 => self.freq_eu,
		}
	}
}

impl Default for Config {
	fn default() -> Config {
		Config {
			port: PathBuf::from("/dev/serial0"),
			baud_rate: 57600,
			timeout: Duration::from_secs(2),
			region: Region::UsRn2903,
			auto_config: AutoConfig::Manual,
			freq_us: 915_000_000,
			freq_eu: 868_000_000,
		}
	}
}
