//! The HAT's four digital IO lines, D1 to D4.

use log::debug;
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::{Error, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
	D1,
	D2,
	D3,
	D4,
}

impl Channel {
	pub const ALL: [Channel; 4] = [Channel::D1, Channel::D2, Channel::D3, Channel::D4];

	/// BCM number of the Pi pin the line is wired to.
	pub fn bcm_pin(&self) -> u8 {
		match self {
			Channel::D1 => 21,
			Channel::D2 => 22,
			Channel::D3 => 23,
			Channel::D4 => 24,
		}
	}

	fn index(&self) -> usize {
		*self as usize
	}
}

/// Board numbering, 1 to 4.
impl TryFrom<u8> for Channel {
	type Error = Error;

	fn try_from(number: u8) -> Result<Channel> {
		match number {
			1 => Ok(Channel::D1),
			2 => Ok(Channel::D2),
			3 => Ok(Channel::D3),
			4 => Ok(Channel::D4),
			_ => Err(Error::invalid("ch", format!("ch is outside of 1 and 4, got {}", number))),
		}
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
	/// Input with the internal pull-down enabled.
	#[default]
	Input,
	/// Output, driven low when the port is opened.
	Output,
}

enum Line {
	Input(InputPin),
	Output(OutputPin),
}

/// The four lines, each claimed as input or output. Pins go back to their previous
/// state when the port is dropped.
pub struct DigitalPort {
	lines: [Line; 4],
}

impl DigitalPort {
	pub fn new(directions: [Direction; 4]) -> Result<DigitalPort> {
		let gpio = Gpio::new()?;
		let open = |channel: Channel| -> Result<Line> {
			let pin = gpio.get(channel.bcm_pin())?;
			let line = match directions[channel.index()] {
				Direction::Input => Line::Input(pin.into_input_pulldown()),
				Direction::Output => Line::Output(pin.into_output_low()),
			};
			debug!("{:?} on BCM {} as {:?}", channel, channel.bcm_pin(), directions[channel.index()]);
			Ok(line)
		};
		Ok(DigitalPort { lines: [open(Channel::D1)?, open(Channel::D2)?, open(Channel::D3)?, open(Channel::D4)?] })
	}

	pub fn direction(&self, channel: Channel) -> Direction {
		match self.lines[channel.index()] {
			Line::Input(_) => Direction::Input,
			Line::Output(_) => Direction::Output,
		}
	}

	/// Level of the line. For an output this is the level being driven.
	pub fn read(&self, channel: Channel) -> bool {
		match &self.lines[channel.index()] {
			Line::Input(pin) => pin.is_high(),
			Line::Output(pin) => pin.is_set_high(),
		}
	}

	pub fn write(&mut self, channel: Channel, high: bool) -> Result<()> {
		match &mut self.lines[channel.index()] {
			Line::Output(pin) => {
				if high {
					pin.set_high();
				} else {
					pin.set_low();
				}
				Ok(())
			}
			Line::Input(_) => Err(Error::invalid("ch", format!("{:?} is configured as input", channel))),
		}
	}

	pub fn toggle(&mut self, channel: Channel) -> Result<()> {
		let level = self.read(channel);
		self.write(channel, !level)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn board_numbers_map_to_bcm_pins() {
		let pins: Vec<u8> = (1..=4).map(|n| Channel::try_from(n).unwrap().bcm_pin()).collect();
		assert_eq!(pins, vec![21, 22, 23, 24]);
	}

	#[test]
	fn out_of_range_channel_number() {
		for n in [0u8, 5, 255] {
			assert!(matches!(Channel::try_from(n), Err(Error::InvalidArgument { name: "ch", .. })));
		}
	}

	#[test]
	fn lines_default_to_input() {
		assert_eq!([Direction::default(); 4], [Direction::Input; 4]);
		assert_eq!(Channel::ALL.iter().map(Channel::index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
	}
}
