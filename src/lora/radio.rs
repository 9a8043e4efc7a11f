use std::fmt::Display;
use std::str::FromStr;

use super::command::hex_encode;
use super::mac::check_eu_frequency;
use super::params::{on_off, parse_on_off};
use super::{
	Command, CommandKind, CodingRate, FskBandwidth, GaussianShaping, LoraBandwidth, Modulation, Region, Rn2xx3,
	SpreadingFactor, Transport, MAX_PAYLOAD,
};
use crate::error::check_range;
use crate::{Error, Result};

const US_BAND: (u32, u32) = (902_000_000, 928_000_000);

/// Point-to-point radio commands (`radio`). The LoRaWAN stack must be paused with
/// [`Rn2xx3::mac_pause`] before these take effect.
impl<T: Transport> Rn2xx3<T> {
	fn radio_set(&mut self, param: &str, value: impl Display) -> Result<()> {
		self.execute_ok(Command::new(CommandKind::RadioSet).arg(param).arg(value))
	}

	fn radio_get<V: FromStr>(&mut self, param: &str) -> Result<V> {
		self.query(Command::new(CommandKind::RadioGet).arg(param))
	}

	fn radio_get_flag(&mut self, param: &str) -> Result<bool> {
		self.query_with(Command::new(CommandKind::RadioGet).arg(param), parse_on_off)
	}

	/// Opens the receiver for `window_size` symbols (LoRa) or milliseconds (FSK); 0 keeps
	/// it open until a packet arrives or [`Rn2xx3::radio_rxstop`] is called. The packet
	/// arrives as a second reply.
	pub fn radio_rx(&mut self, window_size: u16) -> Result<()> {
		self.execute_ok(Command::new(CommandKind::RadioRx).arg(window_size))
	}

	/// Starts a transmission. `radio_tx_ok` or `radio_err` arrives as a second reply.
	pub fn radio_tx(&mut self, data: &[u8]) -> Result<()> {
		if data.len() > MAX_PAYLOAD {
			return Err(Error::invalid("data", format!("data length is outside of 0 and {}", MAX_PAYLOAD)));
		}
		self.execute_ok(Command::new(CommandKind::RadioTx).arg(hex_encode(data)))
	}

	/// Continuous wave mode, for test equipment only.
	pub fn radio_cw(&mut self, state: bool) -> Result<()> {
		self.execute_ok(Command::new(CommandKind::Radio).arg("cw").arg(on_off(state)))
	}

	pub fn radio_rxstop(&mut self) -> Result<()> {
		self.execute_ok(Command::new(CommandKind::Radio).arg("rxstop"))
	}

	pub fn radio_set_afcbw(&mut self, bandwidth: FskBandwidth) -> Result<()> {
		self.radio_set("afcbw", bandwidth)
	}

	/// FSK bit rate in bit/s.
	pub fn radio_set_bitrate(&mut self, bitrate: u32) -> Result<()> {
		check_range("bitrate", bitrate, 1, 300_000)?;
		self.radio_set("bitrate", bitrate)
	}

	pub fn radio_set_bt(&mut self, shaping: GaussianShaping) -> Result<()> {
		self.radio_set("bt", shaping)
	}

	pub fn radio_set_bw(&mut self, bandwidth: LoraBandwidth) -> Result<()> {
		self.radio_set("bw", bandwidth)
	}

	pub fn radio_set_cr(&mut self, coding_rate: CodingRate) -> Result<()> {
		self.radio_set("cr", coding_rate)
	}

	pub fn radio_set_crc(&mut self, state: bool) -> Result<()> {
		self.radio_set("crc", on_off(state))
	}

	/// FSK frequency deviation in Hz.
	pub fn radio_set_fdev(&mut self, deviation: u32) -> Result<()> {
		check_range("fdev", deviation, 0, 200_000)?;
		self.radio_set("fdev", deviation)
	}

	/// Carrier frequency in Hz, within the band of the fitted module.
	pub fn radio_set_freq(&mut self, frequency: u32) -> Result<()> {
		match self.region {
			Region::UsRn2903 => check_range("frequency", frequency, US_BAND.0, US_BAND.1)?,
			Region::EuRn2483 => check_eu_frequency("frequency", frequency)?,
		}
		self.radio_set("freq", frequency)
	}

	/// Inverted IQ.
	pub fn radio_set_iqi(&mut self, state: bool) -> Result<()> {
		self.radio_set("iqi", on_off(state))
	}

	pub fn radio_set_mod(&mut self, modulation: Modulation) -> Result<()> {
		self.radio_set("mod", modulation)
	}

	/// Preamble length in symbols.
	pub fn radio_set_prlen(&mut self, length: u16) -> Result<()> {
		self.radio_set("prlen", length)
	}

	/// Output power in dBm: 2 to 20 on the RN2903, -3 to 15 on the RN2483.
	pub fn radio_set_pwr(&mut self, power: i8) -> Result<()> {
		match self.region {
			Region::UsRn2903 => check_range("pwr_out", power, 2, 20)?,
			Region::EuRn2483 => check_range("pwr_out", power, -3, 15)?,
		}
		self.radio_set("pwr", power)
	}

	pub fn radio_set_rxbw(&mut self, bandwidth: FskBandwidth) -> Result<()> {
		self.radio_set("rxbw", bandwidth)
	}

	pub fn radio_set_sf(&mut self, spreading_factor: SpreadingFactor) -> Result<()> {
		self.radio_set("sf", spreading_factor)
	}

	/// Sync word: one byte for LoRa, up to eight for FSK.
	pub fn radio_set_sync(&mut self, sync_word: &[u8]) -> Result<()> {
		check_range("sync_word length", sync_word.len(), 1, 8)?;
		self.radio_set("sync", hex_encode(sync_word))
	}

	/// Watchdog timeout in milliseconds for a single rx/tx; 0 disables it.
	pub fn radio_set_wdt(&mut self, timeout: u32) -> Result<()> {
		self.radio_set("wdt", timeout)
	}

	pub fn radio_get_afcbw(&mut self) -> Result<FskBandwidth> {
		self.radio_get("afcbw")
	}

	pub fn radio_get_bitrate(&mut self) -> Result<u32> {
		self.radio_get("bitrate")
	}

	pub fn radio_get_bt(&mut self) -> Result<GaussianShaping> {
		self.radio_get("bt")
	}

	pub fn radio_get_bw(&mut self) -> Result<LoraBandwidth> {
		self.radio_get("bw")
	}

	pub fn radio_get_cr(&mut self) -> Result<CodingRate> {
		self.radio_get("cr")
	}

	pub fn radio_get_crc(&mut self) -> Result<bool> {
		self.radio_get_flag("crc")
	}

	pub fn radio_get_fdev(&mut self) -> Result<u32> {
		self.radio_get("fdev")
	}

	pub fn radio_get_freq(&mut self) -> Result<u32> {
		self.radio_get("freq")
	}

	pub fn radio_get_iqi(&mut self) -> Result<bool> {
		self.radio_get_flag("iqi")
	}

	pub fn radio_get_mod(&mut self) -> Result<Modulation> {
		self.radio_get("mod")
	}

	pub fn radio_get_prlen(&mut self) -> Result<u16> {
		self.radio_get("prlen")
	}

	pub fn radio_get_pwr(&mut self) -> Result<i8> {
		self.radio_get("pwr")
	}

	/// RSSI of the last received packet, in dBm.
	pub fn radio_get_rssi(&mut self) -> Result<i16> {
		self.radio_get("rssi")
	}

	pub fn radio_get_rxbw(&mut self) -> Result<FskBandwidth> {
		self.radio_get("rxbw")
	}

	pub fn radio_get_sf(&mut self) -> Result<SpreadingFactor> {
		self.radio_get("sf")
	}

	/// SNR of the last received packet, in dB.
	pub fn radio_get_snr(&mut self) -> Result<i8> {
		self.radio_get("snr")
	}

	pub fn radio_get_sync(&mut self) -> Result<String> {
		self.execute(&Command::new(CommandKind::RadioGet).arg("sync"))
	}

	pub fn radio_get_wdt(&mut self) -> Result<u32> {
		self.radio_get("wdt")
	}
}

#[cfg(test)]
mod tests {
	use super::super::mock::driver;
	use super::*;

	#[test]
	fn rx_and_tx_wire_format() {
		let mut lora = driver(Region::UsRn2903, &["ok", "ok", "ok", "ok"]);
		lora.radio_rx(0).unwrap();
		lora.radio_tx(b"Hello").unwrap();
		lora.radio_cw(false).unwrap();
		lora.radio_rxstop().unwrap();
		assert_eq!(lora.transport().written, vec!["radio rx 0", "radio tx 48656C6C6F", "radio cw off", "radio rxstop"]);
	}

	#[test]
	fn tx_rejects_oversized_payload() {
		let mut lora = driver(Region::UsRn2903, &[]);
		assert!(matches!(lora.radio_tx(&[0; 256]), Err(Error::InvalidArgument { name: "data", .. })));
		assert!(lora.transport().written.is_empty());
	}

	#[test]
	fn busy_module_rejects_rx() {
		let mut lora = driver(Region::UsRn2903, &["busy"]);
		match lora.radio_rx(0) {
			Err(Error::Rejected { command, reply }) => {
				assert_eq!(command, "radio rx 0");
				assert_eq!(reply, "busy");
			}
			other => panic!("unexpected {:?}", other.map_err(|e| e.to_string())),
		}
	}

	#[test]
	fn frequency_range_depends_on_region() {
		let mut us = driver(Region::UsRn2903, &["ok"]);
		assert!(us.radio_set_freq(868_000_000).is_err());
		us.radio_set_freq(902_000_000).unwrap();

		let mut eu = driver(Region::EuRn2483, &["ok", "ok"]);
		assert!(eu.radio_set_freq(915_000_000).is_err());
		assert!(eu.radio_set_freq(434_800_000).is_err());
		eu.radio_set_freq(433_050_000).unwrap();
		eu.radio_set_freq(870_000_000).unwrap();
	}

	#[test]
	fn power_range_depends_on_region() {
		let mut us = driver(Region::UsRn2903, &["ok"]);
		assert!(us.radio_set_pwr(1).is_err());
		assert!(us.radio_set_pwr(21).is_err());
		us.radio_set_pwr(20).unwrap();

		let mut eu = driver(Region::EuRn2483, &["ok"]);
		assert!(eu.radio_set_pwr(16).is_err());
		eu.radio_set_pwr(-3).unwrap();
		assert_eq!(eu.transport().written, vec!["radio set pwr -3"]);
	}

	#[test]
	fn fsk_setters() {
		let mut lora = driver(Region::UsRn2903, &["ok"; 6]);
		lora.radio_set_mod(Modulation::Fsk).unwrap();
		lora.radio_set_bitrate(50_000).unwrap();
		lora.radio_set_fdev(25_000).unwrap();
		lora.radio_set_rxbw(FskBandwidth::Khz41_7).unwrap();
		lora.radio_set_bt(GaussianShaping::Bt0_5).unwrap();
		lora.radio_set_sync(&[0xC1, 0x94, 0xC1]).unwrap();
		assert_eq!(
			lora.transport().written,
			vec![
				"radio set mod fsk",
				"radio set bitrate 50000",
				"radio set fdev 25000",
				"radio set rxbw 41.7",
				"radio set bt 0.5",
				"radio set sync C194C1",
			]
		);
		assert!(lora.radio_set_bitrate(0).is_err());
		assert!(lora.radio_set_fdev(200_001).is_err());
		assert!(lora.radio_set_sync(&[]).is_err());
		assert!(lora.radio_set_sync(&[0; 9]).is_err());
	}

	#[test]
	fn getters_parse_typed_values() {
		let mut lora = driver(
			Region::UsRn2903,
			&["lora", "915000000", "sf12", "125", "4/8", "on", "off", "14", "-97", "-12", "12", "15000", "none"],
		);
		assert_eq!(lora.radio_get_mod().unwrap(), Modulation::Lora);
		assert_eq!(lora.radio_get_freq().unwrap(), 915_000_000);
		assert_eq!(lora.radio_get_sf().unwrap(), SpreadingFactor::Sf12);
		assert_eq!(lora.radio_get_bw().unwrap(), LoraBandwidth::Khz125);
		assert_eq!(lora.radio_get_cr().unwrap(), CodingRate::Cr4_8);
		assert!(lora.radio_get_crc().unwrap());
		assert!(!lora.radio_get_iqi().unwrap());
		assert_eq!(lora.radio_get_pwr().unwrap(), 14);
		assert_eq!(lora.radio_get_rssi().unwrap(), -97);
		assert_eq!(lora.radio_get_snr().unwrap(), -12);
		assert_eq!(lora.radio_get_sync().unwrap(), "12");
		assert_eq!(lora.radio_get_wdt().unwrap(), 15_000);
		assert_eq!(lora.radio_get_bt().unwrap(), GaussianShaping::Disabled);
		assert_eq!(lora.transport().written[8], "radio get rssi");
	}

	#[test]
	fn unknown_token_is_unexpected_reply() {
		let mut lora = driver(Region::UsRn2903, &["sf6"]);
		match lora.radio_get_sf() {
			Err(Error::UnexpectedReply { command, reply }) => {
				assert_eq!(command, "radio get sf");
				assert_eq!(reply, "sf6");
			}
			other => panic!("unexpected {:?}", other),
		}
	}
}
