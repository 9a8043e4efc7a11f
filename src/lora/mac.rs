use std::fmt::Display;
use std::str::FromStr;

use super::command::hex_encode;
use super::params::{on_off, parse_on_off};
use super::{
	Command, CommandKind, DeviceClass, EuBand, JoinMode, MacStatus, Region, Rn2xx3, Rx2Frequency, Transport, UplinkType,
};
use crate::error::check_range;
use crate::{Error, Result};

const MAX_CHANNEL: u8 = 71;
const EU_868: (u32, u32) = (863_000_000, 870_000_000);
const EU_433: (u32, u32) = (433_050_000, 434_790_000);

pub(super) fn check_eu_frequency(name: &'static str, frequency: u32) -> Result<()> {
	let within = |(min, max): (u32, u32)| (min..=max).contains(&frequency);
	if !within(EU_868) && !within(EU_433) {
		return Err(Error::invalid(
			name,
			format!("{} is outside of {} and {} or {} and {}", name, EU_868.0, EU_868.1, EU_433.0, EU_433.1),
		));
	}
	Ok(())
}

fn check_channel(channel_id: u8) -> Result<()> {
	check_range("channel_id", channel_id, 0, MAX_CHANNEL)
}

fn parse_hex_u32(reply: &str) -> Option<u32> {
	u32::from_str_radix(reply, 16).ok()
}

fn parse_pair<A: FromStr, B: FromStr>(reply: &str) -> Option<(A, B)> {
	let mut parts = reply.split_whitespace();
	let first = parts.next()?.parse().ok()?;
	let second = parts.next()?.parse().ok()?;
	if parts.next().is_some() {
		return None;
	}
	Some((first, second))
}

/// LoRaWAN Class A and Class C commands (`mac`).
impl<T: Transport> Rn2xx3<T> {
	fn mac(&mut self, action: &str) -> Result<()> {
		self.execute_ok(Command::new(CommandKind::Mac).arg(action))
	}

	fn mac_set(&mut self, param: &str, value: impl Display) -> Result<()> {
		self.execute_ok(Command::new(CommandKind::MacSet).arg(param).arg(value))
	}

	fn mac_get<V: FromStr>(&mut self, param: &str) -> Result<V> {
		self.query(Command::new(CommandKind::MacGet).arg(param))
	}

	fn mac_get_flag(&mut self, param: &str) -> Result<bool> {
		self.query_with(Command::new(CommandKind::MacGet).arg(param), parse_on_off)
	}

	fn mac_get_hex(&mut self, param: &str) -> Result<u32> {
		self.query_with(Command::new(CommandKind::MacGet).arg(param), parse_hex_u32)
	}

	/// Restores the LoRaWAN defaults, keys included. `band` selects the RN2483 frequency
	/// plan and must be `None` on an RN2903.
	pub fn mac_reset(&mut self, band: Option<EuBand>) -> Result<()> {
		let mut command = Command::new(CommandKind::Mac).arg("reset");
		if let Some(band) = band {
			if self.region != Region::EuRn2483 {
				return Err(Error::invalid("band", "band is only available on the RN2483"));
			}
			command = command.arg(band);
		}
		self.execute_ok(command)
	}

	/// Queues an uplink on `portno` (1 to 223). The transmission result arrives as a
	/// second reply.
	pub fn mac_tx(&mut self, uplink_type: UplinkType, portno: u8, data: &[u8]) -> Result<()> {
		check_range("portno", portno, 1, 223)?;
		self.execute_ok(Command::new(CommandKind::Mac).arg("tx").arg(uplink_type).arg(portno).arg(hex_encode(data)))
	}

	/// Starts a join. `accepted` or `denied` arrives as a second reply.
	pub fn mac_join(&mut self, mode: JoinMode) -> Result<()> {
		self.execute_ok(Command::new(CommandKind::Mac).arg("join").arg(mode))
	}

	pub fn mac_save(&mut self) -> Result<()> {
		self.mac("save")
	}

	pub fn mac_force_enable(&mut self) -> Result<()> {
		self.mac("forceENABLE")
	}

	/// Pauses the LoRaWAN stack so the radio can be driven directly. Returns how many
	/// milliseconds the stack can stay paused.
	pub fn mac_pause(&mut self) -> Result<u32> {
		self.query(Command::new(CommandKind::Mac).arg("pause"))
	}

	pub fn mac_resume(&mut self) -> Result<()> {
		self.mac("resume")
	}

	pub fn mac_set_adr(&mut self, state: bool) -> Result<()> {
		self.mac_set("adr", on_off(state))
	}

	pub fn mac_set_appeui(&mut self, appeui: &[u8; 8]) -> Result<()> {
		self.mac_set("appeui", hex_encode(appeui))
	}

	pub fn mac_set_appkey(&mut self, appkey: &[u8; 16]) -> Result<()> {
		self.mac_set("appkey", hex_encode(appkey))
	}

	pub fn mac_set_appskey(&mut self, appskey: &[u8; 16]) -> Result<()> {
		self.mac_set("appskey", hex_encode(appskey))
	}

	/// Automatic reply to downlinks that request an acknowledgement.
	pub fn mac_set_ar(&mut self, state: bool) -> Result<()> {
		self.mac_set("ar", on_off(state))
	}

	/// Battery level for the Device Status Answer: 0 external power, 1 to 254 level,
	/// 255 not measurable.
	pub fn mac_set_bat(&mut self, level: u8) -> Result<()> {
		self.mac_set("bat", level)
	}

	/// Frequency of a user channel (3 to 15). The default channels are fixed.
	pub fn mac_set_ch_freq(&mut self, channel_id: u8, frequency: u32) -> Result<()> {
		check_range("channel_id", channel_id, 3, 15)?;
		check_eu_frequency("frequency", frequency)?;
		self.execute_ok(Command::new(CommandKind::MacSet).arg("ch").arg("freq").arg(channel_id).arg(frequency))
	}

	pub fn mac_set_ch_dcycle(&mut self, channel_id: u8, duty_cycle: u16) -> Result<()> {
		check_range("channel_id", channel_id, 0, 15)?;
		self.execute_ok(Command::new(CommandKind::MacSet).arg("ch").arg("dcycle").arg(channel_id).arg(duty_cycle))
	}

	pub fn mac_set_ch_drrange(&mut self, channel_id: u8, min_range: u8, max_range: u8) -> Result<()> {
		check_channel(channel_id)?;
		check_range("min_range", min_range, 0, 7)?;
		check_range("max_range", max_range, 0, 7)?;
		self.execute_ok(
			Command::new(CommandKind::MacSet).arg("ch").arg("drrange").arg(channel_id).arg(min_range).arg(max_range),
		)
	}

	pub fn mac_set_ch_status(&mut self, channel_id: u8, enabled: bool) -> Result<()> {
		check_channel(channel_id)?;
		self.execute_ok(Command::new(CommandKind::MacSet).arg("ch").arg("status").arg(channel_id).arg(on_off(enabled)))
	}

	pub fn mac_set_class(&mut self, device_class: DeviceClass) -> Result<()> {
		self.mac_set("class", device_class)
	}

	pub fn mac_set_devaddr(&mut self, address: u32) -> Result<()> {
		self.mac_set("devaddr", format!("{:08X}", address))
	}

	pub fn mac_set_deveui(&mut self, deveui: &[u8; 8]) -> Result<()> {
		self.mac_set("deveui", hex_encode(deveui))
	}

	/// Downlink frame counter for the next reception.
	pub fn mac_set_dnctr(&mut self, f_cnt_down: u32) -> Result<()> {
		self.mac_set("dnctr", f_cnt_down)
	}

	pub fn mac_set_dr(&mut self, data_rate: u8) -> Result<()> {
		check_range("datarate", data_rate, 0, 7)?;
		self.mac_set("dr", data_rate)
	}

	/// Link check interval in seconds; 0 disables it.
	pub fn mac_set_linkchk(&mut self, interval: u16) -> Result<()> {
		self.mac_set("linkchk", interval)
	}

	pub fn mac_set_mcast(&mut self, state: bool) -> Result<()> {
		self.mac_set("mcast", on_off(state))
	}

	pub fn mac_set_mcastappskey(&mut self, key: &[u8; 16]) -> Result<()> {
		self.mac_set("mcastappskey", hex_encode(key))
	}

	pub fn mac_set_mcastdevaddr(&mut self, address: u32) -> Result<()> {
		self.mac_set("mcastdevaddr", format!("{:08X}", address))
	}

	pub fn mac_set_mcastdnctr(&mut self, f_mcast_cnt_down: u32) -> Result<()> {
		self.mac_set("mcastdnctr", f_mcast_cnt_down)
	}

	pub fn mac_set_mcastnwkskey(&mut self, key: &[u8; 16]) -> Result<()> {
		self.mac_set("mcastnwkskey", hex_encode(key))
	}

	pub fn mac_set_nwkskey(&mut self, key: &[u8; 16]) -> Result<()> {
		self.mac_set("nwkskey", hex_encode(key))
	}

	/// Output power index: 5 to 10 on the RN2903, 1 to 5 on the RN2483.
	pub fn mac_set_pwridx(&mut self, pwr_index: u8) -> Result<()> {
		match self.region {
			Region::UsRn2903 => check_range("pwr_index", pwr_index, 5, 10)?,
			Region::EuRn2483 => check_range("pwr_index", pwr_index, 1, 5)?,
		}
		self.mac_set("pwridx", pwr_index)
	}

	/// Retransmissions of a confirmed uplink without acknowledgement.
	pub fn mac_set_retx(&mut self, re_tx_nb: u8) -> Result<()> {
		self.mac_set("retx", re_tx_nb)
	}

	/// Second receive window on the RN2903: data rate 8 to 13 on one of the fixed channels.
	pub fn mac_set_rx2_us(&mut self, data_rate: u8, frequency: Rx2Frequency) -> Result<()> {
		check_range("data_rate", data_rate, 8, 13)?;
		self.execute_ok(Command::new(CommandKind::MacSet).arg("rx2").arg(data_rate).arg(frequency))
	}

	/// Second receive window on the RN2483.
	pub fn mac_set_rx2_eu(&mut self, data_rate: u8, frequency: u32) -> Result<()> {
		check_range("data_rate", data_rate, 0, 7)?;
		check_range("frequency", frequency, EU_433.0, EU_868.1)?;
		self.execute_ok(Command::new(CommandKind::MacSet).arg("rx2").arg(data_rate).arg(frequency))
	}

	/// Delay in milliseconds between a transmission and the first receive window.
	pub fn mac_set_rxdelay1(&mut self, rx_delay: u16) -> Result<()> {
		self.mac_set("rxdelay1", rx_delay)
	}

	pub fn mac_set_sync(&mut self, sync_word: u8) -> Result<()> {
		self.mac_set("sync", format!("{:02X}", sync_word))
	}

	/// Uplink frame counter for the next transmission.
	pub fn mac_set_upctr(&mut self, f_cnt_up: u32) -> Result<()> {
		self.mac_set("upctr", f_cnt_up)
	}

	pub fn mac_get_adr(&mut self) -> Result<bool> {
		self.mac_get_flag("adr")
	}

	pub fn mac_get_appeui(&mut self) -> Result<String> {
		self.execute(&Command::new(CommandKind::MacGet).arg("appeui"))
	}

	pub fn mac_get_ar(&mut self) -> Result<bool> {
		self.mac_get_flag("ar")
	}

	pub fn mac_get_ch_freq(&mut self, channel_id: u8) -> Result<u32> {
		check_channel(channel_id)?;
		self.query(Command::new(CommandKind::MacGet).arg("ch").arg("freq").arg(channel_id))
	}

	pub fn mac_get_ch_dcycle(&mut self, channel_id: u8) -> Result<u16> {
		check_range("channel_id", channel_id, 0, 15)?;
		self.query(Command::new(CommandKind::MacGet).arg("ch").arg("dcycle").arg(channel_id))
	}

	/// Minimum and maximum data rate allowed on the channel.
	pub fn mac_get_ch_drrange(&mut self, channel_id: u8) -> Result<(u8, u8)> {
		check_channel(channel_id)?;
		self.query_with(Command::new(CommandKind::MacGet).arg("ch").arg("drrange").arg(channel_id), parse_pair)
	}

	pub fn mac_get_ch_status(&mut self, channel_id: u8) -> Result<bool> {
		check_channel(channel_id)?;
		self.query_with(Command::new(CommandKind::MacGet).arg("ch").arg("status").arg(channel_id), parse_on_off)
	}

	pub fn mac_get_class(&mut self) -> Result<DeviceClass> {
		self.mac_get("class")
	}

	/// Duty cycle prescaler.
	pub fn mac_get_dcycleps(&mut self) -> Result<u16> {
		self.mac_get("dcycleps")
	}

	pub fn mac_get_devaddr(&mut self) -> Result<u32> {
		self.mac_get_hex("devaddr")
	}

	pub fn mac_get_deveui(&mut self) -> Result<String> {
		self.execute(&Command::new(CommandKind::MacGet).arg("deveui"))
	}

	pub fn mac_get_dnctr(&mut self) -> Result<u32> {
		self.mac_get("dnctr")
	}

	pub fn mac_get_dr(&mut self) -> Result<u8> {
		self.mac_get("dr")
	}

	/// Gateways that answered the last link check.
	pub fn mac_get_gwnb(&mut self) -> Result<u8> {
		self.mac_get("gwnb")
	}

	pub fn mac_get_mcast(&mut self) -> Result<bool> {
		self.mac_get_flag("mcast")
	}

	pub fn mac_get_mcastdevaddr(&mut self) -> Result<u32> {
		self.mac_get_hex("mcastdevaddr")
	}

	pub fn mac_get_mcastdnctr(&mut self) -> Result<u32> {
		self.mac_get("mcastdnctr")
	}

	/// Demodulation margin from the last link check answer.
	pub fn mac_get_mrgn(&mut self) -> Result<u8> {
		self.mac_get("mrgn")
	}

	pub fn mac_get_pwridx(&mut self) -> Result<u8> {
		self.mac_get("pwridx")
	}

	pub fn mac_get_retx(&mut self) -> Result<u8> {
		self.mac_get("retx")
	}

	/// Data rate and frequency of the second receive window. The RN2483 needs the
	/// frequency plan to report on.
	pub fn mac_get_rx2(&mut self, band: Option<EuBand>) -> Result<(u8, u32)> {
		let mut command = Command::new(CommandKind::MacGet).arg("rx2");
		if let Some(band) = band {
			command = command.arg(band);
		}
		self.query_with(command, parse_pair)
	}

	pub fn mac_get_rxdelay1(&mut self) -> Result<u16> {
		self.mac_get("rxdelay1")
	}

	pub fn mac_get_rxdelay2(&mut self) -> Result<u16> {
		self.mac_get("rxdelay2")
	}

	pub fn mac_get_status(&mut self) -> Result<MacStatus> {
		let bits = self.mac_get_hex("status")?;
		Ok(MacStatus::from_bits_retain(bits))
	}

	pub fn mac_get_sync(&mut self) -> Result<u8> {
		self.query_with(Command::new(CommandKind::MacGet).arg("sync"), |reply| u8::from_str_radix(reply, 16).ok())
	}

	pub fn mac_get_upctr(&mut self) -> Result<u32> {
		self.mac_get("upctr")
	}
}
