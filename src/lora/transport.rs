use log::trace;
use rppal::uart::{Parity, Uart};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::Result;

// Longest line the module emits is `radio_rx  ` followed by 255 hex encoded bytes.
const MAX_LINE: usize = 1024;

/// Line oriented link to the module.
pub trait Transport {
	/// Writes `line` followed by CR LF.
	fn write_line(&mut self, line: &str) -> Result<()>;

	/// Reads one line without its trailing CR LF. Returns an empty string if nothing
	/// arrived before the read timeout.
	fn read_line(&mut self) -> Result<String>;

	fn delay(&mut self, duration: Duration) {
		thread::sleep(duration);
	}
}

/// The module on a Raspberry Pi UART, 8N1.
pub struct UartTransport {
	uart: Uart,
}

impl UartTransport {
	pub fn open<P: AsRef<Path>>(path: P, baud_rate: u32, timeout: Duration) -> Result<UartTransport> {
		let mut uart = Uart::with_path(path, baud_rate, Parity::None, 8, 1)?;
		uart.set_read_mode(0, timeout)?;
		uart.set_write_mode(true)?;
		Ok(UartTransport { uart })
	}
}

impl Transport for UartTransport {
	fn write_line(&mut self, line: &str) -> Result<()> {
		let mut frame = Vec::with_capacity(line.len() + 2);
		frame.extend_from_slice(line.as_bytes());
		frame.extend_from_slice(b"\r\n");
		let mut written = 0;
		while written < frame.len() {
			written += self.uart.write(&frame[written..])?;
		}
		self.uart.drain()?;
		trace!("uart wrote {} bytes", frame.len());
		Ok(())
	}

	fn read_line(&mut self) -> Result<String> {
		let mut line = Vec::new();
		let mut byte = [0u8; 1];
		while line.len() < MAX_LINE {
			if self.uart.read(&mut byte)? == 0 {
				break;
			}
			line.push(byte[0]);
			if byte[0] == b'\n' {
				break;
			}
		}
		trace!("uart read {} bytes", line.len());
		Ok(strip_line_ending(&String::from_utf8_lossy(&line)).to_string())
	}
}

pub(crate) fn strip_line_ending(line: &str) -> &str {
	line.trim_end_matches(|c| c == '\r' || c == '\n')
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_crlf_only() {
		assert_eq!(strip_line_ending("ok\r\n"), "ok");
		assert_eq!(strip_line_ending("radio_rx  4869\n"), "radio_rx  4869");
		assert_eq!(strip_line_ending("partial"), "partial");
		assert_eq!(strip_line_ending(" ok \r\n"), " ok ");
	}
}
