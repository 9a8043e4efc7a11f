//! Microchip RN2903A / RN2483A LoRa module.
//!
//! Every operation writes one ASCII command line to the module and reads back one reply
//! line. Setters succeed when the module answers `ok`; getters parse the reply into a
//! typed value. Commands that are answered twice (`mac tx`, `mac join`, `radio tx`,
//! `radio rx`) return after the first reply; the second one is picked up with
//! [`Rn2xx3::check_uart_buffer`] or, in the auto modes, by [`Rn2xx3::check_data`] and
//! [`Rn2xx3::send`].

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

mod command;
mod config;
mod mac;
#[cfg(test)]
mod mock;
mod params;
mod radio;
mod sys;
mod transport;

pub use command::Command;
pub use config::Config;
pub use params::{
	AutoConfig, CodingRate, CommandKind, DeviceClass, EuBand, FskBandwidth, GaussianShaping, JoinMode, Led, LedState,
	LoraBandwidth, MacState, MacStatus, Modulation, Region, Rx2Frequency, SpreadingFactor, UnknownToken, UplinkType,
};
pub use transport::{Transport, UartTransport};

use command::{hex_decode, hex_encode};

/// Largest LoRa payload the module transmits in one `radio tx`.
pub const MAX_PAYLOAD: usize = 255;

const RESET_SETTLE: Duration = Duration::from_millis(500);
const STEP_DELAY: Duration = Duration::from_millis(100);

/// Packet delivered by the auto receive mode.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RxPacket {
	pub payload: Vec<u8>,
	pub received_at: DateTime<Utc>,
}

impl RxPacket {
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.payload)
	}
}

/// Result of [`Rn2xx3::check_data`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Received {
	/// Raw module output, returned when no auto mode is configured.
	Line(String),
	Packet(RxPacket),
}

impl Display for Received {
	fn fmt(&self, out: &mut Formatter) -> std::fmt::Result {
		match self {
			Received::Line(line) => out.write_str(line),
			Received::Packet(packet) => out.write_str(&packet.text()),
		}
	}
}

/// Asynchronous output of the module while the receiver is open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
	RadioError,
	/// `radio_rx` followed by the hex encoded payload.
	RadioRx(String),
	Other(String),
}

impl Notification {
	pub fn parse(line: &str) -> Notification {
		if line == "radio_err" {
			return Notification::RadioError;
		}
		match line.strip_prefix("radio_rx") {
			Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => Notification::RadioRx(rest.trim().to_string()),
			_ => Notification::Other(line.to_string()),
		}
	}
}

/// Outcome of [`Rn2xx3::send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
	Transmitted,
	/// The module accepted the command but reported `radio_err` when the transmission ended.
	RadioError,
	/// The module refused the command, e.g. with `busy` or `invalid_param`.
	Rejected(String),
}

pub struct Rn2xx3<T: Transport = UartTransport> {
	transport: T,
	region: Region,
	auto: AutoConfig,
	err_on: bool,
	initialized: bool,
}

impl Rn2xx3<UartTransport> {
	/// Opens the serial port named in `config` and initializes the module.
	pub fn open(config: &Config) -> Result<Rn2xx3<UartTransport>> {
		let transport = UartTransport::open(&config.port, config.baud_rate, config.timeout)?;
		Rn2xx3::new(transport, config)
	}
}

impl<T: Transport> Rn2xx3<T> {
	/// Resets the module behind `transport`, sets up the status LEDs and applies the
	/// configured auto mode.
	pub fn new(transport: T, config: &Config) -> Result<Rn2xx3<T>> {
		let mut lora = Rn2xx3 {
			transport,
			region: config.region,
			auto: config.auto_config,
			err_on: false,
			initialized: false,
		};
		lora.apply_initial_settings(config.frequency())?;
		lora.initialized = true;
		lora.transport.delay(RESET_SETTLE);
		Ok(lora)
	}

	fn apply_initial_settings(&mut self, frequency: u32) -> Result<()> {
		let version = self.sys_reset()?;
		info!("module reset: {}", version);

		for led in Led::ALL {
			self.config_led(*led)?;
		}
		for led in Led::ALL {
			self.set_led(*led, LedState::Off)?;
		}
		self.transport.delay(RESET_SETTLE);

		match self.auto {
			AutoConfig::Manual => {}
			AutoConfig::LoraRx => {
				self.configure_point_to_point(frequency)?;
				self.transport.delay(STEP_DELAY);
				self.radio_rx(0)?;
				self.set_led(Led::Con, LedState::On)?;
			}
			AutoConfig::LoraTx => {
				self.configure_point_to_point(frequency)?;
			}
		}
		Ok(())
	}

	fn configure_point_to_point(&mut self, frequency: u32) -> Result<()> {
		self.radio_set_mod(Modulation::Lora)?;
		self.radio_set_freq(frequency)?;
		self.radio_set_sf(SpreadingFactor::Sf7)?;
		self.radio_set_bw(LoraBandwidth::Khz125)?;
		self.radio_set_cr(CodingRate::Cr4_5)?;
		self.radio_set_crc(true)?;
		self.radio_set_sync(&[0x12])?;
		self.radio_set_wdt(0)?;
		self.radio_set_pwr(14)?;
		self.transport.delay(STEP_DELAY);
		let paused_for = self.mac_pause()?;
		debug!("mac paused for {} ms", paused_for);
		Ok(())
	}

	pub fn region(&self) -> Region {
		self.region
	}

	pub fn auto_config(&self) -> AutoConfig {
		self.auto
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	pub fn transport_mut(&mut self) -> &mut T {
		&mut self.transport
	}

	/// Writes `command` and returns the module's reply line.
	pub fn execute(&mut self, command: &Command) -> Result<String> {
		self.exchange(&command.to_string())
	}

	/// Writes an arbitrary line and returns the module's reply line.
	pub fn send_raw(&mut self, line: &str) -> Result<String> {
		self.exchange(line)
	}

	fn exchange(&mut self, line: &str) -> Result<String> {
		debug!("> {}", line);
		self.transport.write_line(line)?;
		self.receive_reply(line)
	}

	fn receive_reply(&mut self, line: &str) -> Result<String> {
		let reply = self.transport.read_line()?;
		debug!("< {}", reply);
		if reply.is_empty() {
			return Err(Error::NoResponse { command: line.to_string() });
		}
		Ok(reply)
	}

	pub(crate) fn execute_ok(&mut self, command: Command) -> Result<()> {
		let reply = self.execute(&command)?;
		self.expect_ok(&command, reply)
	}

	/// For commands the module only answers once `wait` has passed. The reply gets one
	/// extra read timeout on top of `wait` to arrive.
	pub(crate) fn execute_ok_after(&mut self, command: Command, wait: Duration) -> Result<()> {
		let line = command.to_string();
		debug!("> {}", line);
		self.transport.write_line(&line)?;
		self.transport.delay(wait);
		let reply = match self.check_uart_buffer()? {
			Some(reply) => reply,
			None => self.receive_reply(&line)?,
		};
		self.expect_ok(&command, reply)
	}

	fn expect_ok(&self, command: &Command, reply: String) -> Result<()> {
		if reply != "ok" {
			warn!("'{}' rejected: {}", command, reply);
			return Err(Error::Rejected { command: command.to_string(), reply });
		}
		Ok(())
	}

	pub(crate) fn query<V: FromStr>(&mut self, command: Command) -> Result<V> {
		self.query_with(command, |reply| reply.parse().ok())
	}

	pub(crate) fn query_with<V, F>(&mut self, command: Command, parse: F) -> Result<V>
	where
		F: FnOnce(&str) -> Option<V>,
	{
		let reply = self.execute(&command)?;
		match parse(reply.trim()) {
			Some(value) => Ok(value),
			None => Err(Error::UnexpectedReply { command: command.to_string(), reply }),
		}
	}

	/// Reads one pending line, if any arrived before the read timeout.
	pub fn check_uart_buffer(&mut self) -> Result<Option<String>> {
		let line = self.transport.read_line()?;
		if line.is_empty() {
			return Ok(None);
		}
		debug!("< {}", line);
		Ok(Some(line))
	}

	/// Polls the module for output.
	///
	/// Without an auto mode the raw line is returned. In auto receive mode radio errors
	/// are recovered from and received packets are returned; anything else is dropped.
	/// In auto transmit mode nothing is returned.
	pub fn check_data(&mut self) -> Result<Option<Received>> {
		let line = match self.check_uart_buffer()? {
			Some(line) => line,
			None => return Ok(None),
		};
		match self.auto {
			AutoConfig::Manual => Ok(Some(Received::Line(line))),
			AutoConfig::LoraRx => Ok(self.auto_rx_routine(&line)?.map(Received::Packet)),
			AutoConfig::LoraTx => Ok(None),
		}
	}

	fn auto_rx_routine(&mut self, line: &str) -> Result<Option<RxPacket>> {
		match Notification::parse(line) {
			Notification::RadioError => {
				warn!("radio error, restarting receiver");
				self.set_led(Led::Con, LedState::Off)?;
				self.set_led(Led::Err, LedState::On)?;
				self.radio_rx(0)?;
				self.set_led(Led::Err, LedState::Off)?;
				self.set_led(Led::Con, LedState::On)?;
				Ok(None)
			}
			Notification::RadioRx(data) => {
				let received_at = Utc::now();
				self.set_led(Led::Act, LedState::On)?;
				if let Err(e) = self.radio_rx(0) {
					warn!("restarting receiver failed: {}", e);
				}
				let payload = hex_decode(&data);
				self.set_led(Led::Act, LedState::Off)?;
				match payload {
					Some(payload) => {
						debug!("received {} bytes", payload.len());
						Ok(Some(RxPacket { payload, received_at }))
					}
					None => Err(Error::UnexpectedReply { command: "radio rx 0".to_string(), reply: line.to_string() }),
				}
			}
			Notification::Other(line) => {
				debug!("ignoring '{}'", line);
				Ok(None)
			}
		}
	}

	/// Transmits `payload` with the auto transmit settings, blinking ACT and latching ERR
	/// on failure until the next call.
	pub fn send(&mut self, payload: impl AsRef<[u8]>) -> Result<TxStatus> {
		let payload = payload.as_ref();
		if payload.len() > MAX_PAYLOAD {
			return Err(Error::invalid("data", format!("data length is outside of 0 and {}", MAX_PAYLOAD)));
		}

		if self.err_on {
			self.err_on = false;
			self.set_led(Led::Err, LedState::Off)?;
		}
		self.set_led(Led::Act, LedState::On)?;
		let status = self.transmit(payload);
		self.set_led(Led::Act, LedState::Off)?;

		if !matches!(status, Ok(TxStatus::Transmitted)) {
			warn!("transmission failed: {:?}", status);
			self.err_on = true;
			self.set_led(Led::Err, LedState::On)?;
		}
		status
	}

	fn transmit(&mut self, payload: &[u8]) -> Result<TxStatus> {
		let command = Command::new(CommandKind::RadioTx).arg(hex_encode(payload));
		let reply = self.execute(&command)?;
		if reply != "ok" {
			return Ok(TxStatus::Rejected(reply));
		}
		match self.check_uart_buffer()?.as_deref() {
			Some("radio_tx_ok") => Ok(TxStatus::Transmitted),
			Some("radio_err") => Ok(TxStatus::RadioError),
			Some(other) => Err(Error::UnexpectedReply { command: command.to_string(), reply: other.to_string() }),
			None => Err(Error::NoResponse { command: command.to_string() }),
		}
	}

	/// Makes `led` a digital output of the module.
	pub fn config_led(&mut self, led: Led) -> Result<()> {
		self.execute_ok(Command::new(CommandKind::SysSet).arg("pinmode").arg(led).arg("digout"))
	}

	pub fn set_led(&mut self, led: Led, state: LedState) -> Result<()> {
		self.execute_ok(Command::new(CommandKind::SysSet).arg("pindig").arg(led).arg(state))
	}
}

impl<T: Transport> Drop for Rn2xx3<T> {
	fn drop(&mut self) {
		if !self.initialized {
			return;
		}
		if self.auto != AutoConfig::Manual {
			if let Err(e) = self.radio_rxstop() {
				warn!("radio rxstop on close failed: {}", e);
			}
		}
		for led in Led::ALL {
			if let Err(e) = self.set_led(*led, LedState::Off) {
				warn!("switching {:?} off on close failed: {}", led, e);
			}
		}
	}
}
