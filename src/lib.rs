//! Peripheral helpers for the Raspberry Pi LoRa HAT.
//!
//! - [`lora`]: Microchip RN2903A (US) / RN2483A (EU) LoRa module on the Pi serial port
//! - [`analog`]: TI ADS1018 12-bit ADC on SPI
//! - [`digital`]: the four digital IO lines
//! - [`accel`]: NXP MMA8491Q accelerometer and tilt sensor
//!
//! ```no_run
//! use lorahat::lora::{AutoConfig, Config, Region, Rn2xx3};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//! 	let config = Config {
//! 		region: Region::EuRn2483,
//! 		auto_config: AutoConfig::LoraRx,
//! 		..Config::default()
//! 	};
//! 	let mut lora = Rn2xx3::open(&config)?;
//! 	loop {
//! 		if let Some(received) = lora.check_data()? {
//! 			println!("{}", received);
//! 		}
//! 	}
//! }
//! ```

pub mod accel;
pub mod analog;
pub mod digital;
mod error;
pub mod lora;

pub use error::{Error, Result};
