use std::fmt::{Display, Formatter, Write};

use super::params::CommandKind;

/// One request line: a command prefix followed by space separated arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
	kind: CommandKind,
	args: Vec<String>,
}

impl Command {
	pub fn new(kind: CommandKind) -> Command {
		Command { kind, args: Vec::new() }
	}

	pub fn arg(mut self, arg: impl Display) -> Command {
		self.args.push(arg.to_string());
		self
	}

	pub fn kind(&self) -> CommandKind {
		self.kind
	}
}

impl Display for Command {
	fn fmt(&self, out: &mut Formatter) -> std::fmt::Result {
		write!(out, "{}", self.kind)?;
		for arg in &self.args {
			write!(out, " {}", arg)?;
		}
		Ok(())
	}
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
	let mut out = String::with_capacity(bytes.len() * 2);
	for b in bytes {
		let _ = write!(out, "{:02X}", b);
	}
	out
}

/// Decodes a hex string of either case. `None` on odd length or a non-hex digit.
pub(crate) fn hex_decode(text: &str) -> Option<Vec<u8>> {
	let text = text.trim();
	if text.len() % 2 != 0 || !text.is_ascii() {
		return None;
	}
	(0..text.len())
		.step_by(2)
		.map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn command_line_joins_prefix_and_args() {
		let cmd = Command::new(CommandKind::MacSet).arg("ch").arg("drrange").arg(3).arg(0).arg(5);
		assert_eq!(cmd.to_string(), "mac set ch drrange 3 0 5");
	}

	#[test]
	fn command_without_args_is_just_the_prefix() {
		assert_eq!(Command::new(CommandKind::RadioRx).to_string(), "radio rx");
	}

	#[test]
	fn hex_is_uppercase_and_zero_padded() {
		assert_eq!(hex_encode(&[0x00, 0x0A, 0xFF]), "000AFF");
		assert_eq!(hex_encode(b"Hi"), "4869");
		assert_eq!(hex_encode(&[]), "");
	}

	#[test]
	fn hex_decode_rejects_malformed_input() {
		assert_eq!(hex_decode("48656c6C6f"), Some(b"Hello".to_vec()));
		assert_eq!(hex_decode("486"), None);
		assert_eq!(hex_decode("zz"), None);
		assert_eq!(hex_decode(""), Some(Vec::new()));
	}
}
