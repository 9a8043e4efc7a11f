use std::time::Duration;

use super::{Command, CommandKind, Rn2xx3, Transport};
use crate::error::check_range;
use crate::{Error, Result};

const NVM_FIRST: u16 = 0x300;
const NVM_LAST: u16 = 0x3FF;

fn check_nvm_address(address: u16) -> Result<()> {
	if !(NVM_FIRST..=NVM_LAST).contains(&address) {
		return Err(Error::invalid("address", format!("address is outside of {:X} and {:X}", NVM_FIRST, NVM_LAST)));
	}
	Ok(())
}

/// System commands (`sys`).
impl<T: Transport> Rn2xx3<T> {
	/// Puts the module to sleep for `length` milliseconds and blocks until it wakes up and
	/// answers.
	pub fn sys_sleep(&mut self, length: u32) -> Result<()> {
		check_range("length", length, 100, u32::MAX)?;
		let command = Command::new(CommandKind::Sys).arg("sleep").arg(length);
		self.execute_ok_after(command, Duration::from_millis(length as u64))
	}

	/// Restarts the module, reloading saved LoRaWAN settings. Returns the firmware version line.
	pub fn sys_reset(&mut self) -> Result<String> {
		self.execute(&Command::new(CommandKind::Sys).arg("reset"))
	}

	/// Restores factory defaults, wiping user EEPROM, and restarts. Returns the firmware version line.
	pub fn sys_factory_reset(&mut self) -> Result<String> {
		self.execute(&Command::new(CommandKind::Sys).arg("factoryRESET"))
	}

	/// Writes one byte of user EEPROM (addresses 0x300 to 0x3FF).
	pub fn sys_set_nvm(&mut self, address: u16, data: u8) -> Result<()> {
		check_nvm_address(address)?;
		self.execute_ok(
			Command::new(CommandKind::SysSet).arg("nvm").arg(format!("{:X}", address)).arg(format!("{:02X}", data)),
		)
	}

	/// Firmware version line, e.g. `RN2903 1.0.5 Nov 06 2018 10:45:27`.
	pub fn sys_get_ver(&mut self) -> Result<String> {
		self.execute(&Command::new(CommandKind::SysGet).arg("ver"))
	}

	pub fn sys_get_nvm(&mut self, address: u16) -> Result<u8> {
		check_nvm_address(address)?;
		self.query_with(Command::new(CommandKind::SysGet).arg("nvm").arg(format!("{:X}", address)), |reply| {
			u8::from_str_radix(reply, 16).ok()
		})
	}

	/// Supply voltage in millivolts.
	pub fn sys_get_vdd(&mut self) -> Result<u16> {
		self.query(Command::new(CommandKind::SysGet).arg("vdd"))
	}

	/// Preprogrammed EUI, as hex.
	pub fn sys_get_hweui(&mut self) -> Result<String> {
		self.execute(&Command::new(CommandKind::SysGet).arg("hweui"))
	}
}
