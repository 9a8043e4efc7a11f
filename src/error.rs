use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
	Gpio(rppal::gpio::Error),
	I2c(rppal::i2c::Error),
	Spi(rppal::spi::Error),
	Uart(rppal::uart::Error),
	/// An argument failed its range or membership check. Nothing was sent to the device.
	InvalidArgument { name: &'static str, reason: String },
	/// The device did not answer within the read timeout.
	NoResponse { command: String },
	/// The device answered something other than `ok` to a command that expects it.
	Rejected { command: String, reply: String },
	/// The device answered, but the reply could not be parsed.
	UnexpectedReply { command: String, reply: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Error {
		Error::InvalidArgument { name, reason: reason.into() }
	}
}

/// Fails with the same wording for every bounded argument: "<name> is outside of <min> and <max>".
pub(crate) fn check_range<V>(name: &'static str, value: V, min: V, max: V) -> Result<()>
where
	V: PartialOrd + Display,
{
	if value < min || value > max {
		return Err(Error::invalid(name, format!("{} is outside of {} and {}", name, min, max)));
	}
	Ok(())
}

impl Display for Error {
	fn fmt(&self, out: &mut Formatter) -> std::fmt::Result {
		match self {
			Error::Gpio(e) => write!(out, "gpio: {}", e),
			Error::I2c(e) => write!(out, "i2c: {}", e),
			Error::Spi(e) => write!(out, "spi: {}", e),
			Error::Uart(e) => write!(out, "uart: {}", e),
			Error::InvalidArgument { reason, .. } => write!(out, "invalid argument: {}", reason),
			Error::NoResponse { command } => write!(out, "no response to '{}'", command),
			Error::Rejected { command, reply } => write!(out, "'{}' rejected: {}", command, reply),
			Error::UnexpectedReply { command, reply } => write!(out, "unexpected reply to '{}': {}", command, reply),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Gpio(e) => Some(e),
			Error::I2c(e) => Some(e),
			Error::Spi(e) => Some(e),
			Error::Uart(e) => Some(e),
			_ => None,
		}
	}
}

impl From<rppal::gpio::Error> for Error {
	fn from(e: rppal::gpio::Error) -> Error {
		Error::Gpio(e)
	}
}

impl From<rppal::i2c::Error> for Error {
	fn from(e: rppal::i2c::Error) -> Error {
		Error::I2c(e)
	}
}

impl From<rppal::spi::Error> for Error {
	fn from(e: rppal::spi::Error) -> Error {
		Error::Spi(e)
	}
}

impl From<rppal::uart::Error> for Error {
	fn from(e: rppal::uart::Error) -> Error {
		Error::Uart(e)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn range_check_message_names_the_argument() {
		let err = check_range("portno", 0u8, 1, 223).unwrap_err();
		match err {
			Error::InvalidArgument { name, reason } => {
				assert_eq!(name, "portno");
				assert_eq!(reason, "portno is outside of 1 and 223");
			}
			other => panic!("unexpected error {:?}", other),
		}
	}

	#[test]
	fn range_check_bounds_are_inclusive() {
		assert!(check_range("pwr", -3i8, -3, 15).is_ok());
		assert!(check_range("pwr", 15i8, -3, 15).is_ok());
		assert!(check_range("pwr", 16i8, -3, 15).is_err());
	}
}
