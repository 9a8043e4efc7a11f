use bitflags::bitflags;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A reply token that matched none of the known values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToken(pub String);

impl Display for UnknownToken {
	fn fmt(&self, out: &mut Formatter) -> std::fmt::Result {
		write!(out, "unknown token '{}'", self.0)
	}
}

impl std::error::Error for UnknownToken {}

/// Declares an enum whose variants map one-to-one onto a protocol token.
macro_rules! tokens {
	($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
		#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
		pub enum $name {
			$($(#[$vmeta])* $variant),+
		}

		impl $name {
			pub const ALL: &'static [$name] = &[$($name::$variant),+];

			pub fn as_str(&self) -> &'static str {
				match self {
					$($name::$variant => $token),+
				}
			}
		}

		impl Display for $name {
			fn fmt(&self, out: &mut Formatter) -> std::fmt::Result {
				out.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = UnknownToken;

			fn from_str(s: &str) -> Result<Self, UnknownToken> {
				let s = s.trim();
				$(
					if s.eq_ignore_ascii_case($token) {
						return Ok($name::$variant);
					}
				)+
				Err(UnknownToken(s.to_string()))
			}
		}
	};
}

tokens! {
	/// Command prefixes understood by the module.
	CommandKind {
		Sys => "sys",
		SysSet => "sys set",
		SysGet => "sys get",
		Mac => "mac",
		MacSet => "mac set",
		MacGet => "mac get",
		Radio => "radio",
		RadioSet => "radio set",
		RadioGet => "radio get",
		RadioRx => "radio rx",
		RadioTx => "radio tx",
	}
}

tokens! {
	/// Status LEDs wired to the module's own GPIO pins.
	Led {
		Con => "GPIO2",
		Act => "GPIO1",
		Err => "GPIO0",
	}
}

tokens! {
	/// LEDs are active-low: "0" lights them.
	LedState {
		On => "0",
		Off => "1",
	}
}

tokens! {
	Modulation {
		Lora => "lora",
		Fsk => "fsk",
	}
}

tokens! {
	UplinkType {
		Confirmed => "cnf",
		Unconfirmed => "uncnf",
	}
}

tokens! {
	JoinMode {
		Otaa => "otaa",
		Abp => "abp",
	}
}

tokens! {
	DeviceClass {
		A => "a",
		C => "c",
	}
}

tokens! {
	/// Frequency plans the RN2483 can be reset to.
	EuBand {
		Mhz433 => "433",
		Mhz868 => "868",
	}
}

tokens! {
	/// US second receive window frequencies, 600 kHz apart.
	Rx2Frequency {
		Mhz923_3 => "923300000",
		Mhz923_9 => "923900000",
		Mhz924_5 => "924500000",
		Mhz925_1 => "925100000",
		Mhz925_7 => "925700000",
		Mhz926_3 => "926300000",
		Mhz926_9 => "926900000",
		Mhz927_5 => "927500000",
	}
}

tokens! {
	/// FSK receive and AFC bandwidths, in kHz.
	FskBandwidth {
		Khz250 => "250",
		Khz125 => "125",
		Khz62_5 => "62.5",
		Khz31_3 => "31.3",
		Khz15_6 => "15.6",
		Khz7_8 => "7.8",
		Khz3_9 => "3.9",
		Khz200 => "200",
		Khz100 => "100",
		Khz50 => "50",
		Khz25 => "25",
		Khz12_5 => "12.5",
		Khz6_3 => "6.3",
		Khz3_1 => "3.1",
		Khz166_7 => "166.7",
		Khz83_3 => "83.3",
		Khz41_7 => "41.7",
		Khz20_8 => "20.8",
		Khz10_4 => "10.4",
		Khz5_2 => "5.2",
		Khz2_6 => "2.6",
	}
}

tokens! {
	/// Gaussian baseband shaping applied to FSK transmissions.
	GaussianShaping {
		Disabled => "none",
		Bt1_0 => "1.0",
		Bt0_5 => "0.5",
		Bt0_3 => "0.3",
	}
}

tokens! {
	LoraBandwidth {
		Khz125 => "125",
		Khz250 => "250",
		Khz500 => "500",
	}
}

tokens! {
	CodingRate {
		Cr4_5 => "4/5",
		Cr4_6 => "4/6",
		Cr4_7 => "4/7",
		Cr4_8 => "4/8",
	}
}

tokens! {
	SpreadingFactor {
		Sf7 => "sf7",
		Sf8 => "sf8",
		Sf9 => "sf9",
		Sf10 => "sf10",
		Sf11 => "sf11",
		Sf12 => "sf12",
	}
}

pub(crate) fn on_off(state: bool) -> &'static str {
	if state {
		"on"
	} else {
		"off"
	}
}

pub(crate) fn parse_on_off(reply: &str) -> Option<bool> {
	match reply.trim() {
		"on" => Some(true),
		"off" => Some(false),
		_ => None,
	}
}

/// Which module is fitted on the board. Decides default frequency and parameter ranges.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Region {
	UsRn2903,
	EuRn2483,
}

/// What the driver sets up after resetting the module.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AutoConfig {
	/// Reset only; every radio parameter is left to the caller.
	Manual,
	/// Point-to-point LoRa receiver with notification handling in `check_data`.
	LoraRx,
	/// Point-to-point LoRa transmitter driven through `send`.
	LoraTx,
}

bitflags! {
	/// Decoded `mac get status` word.
	#[derive(Copy, Clone, Debug, PartialEq, Eq)]
	pub struct MacStatus: u32 {
		const JOINED = 1 << 0;
		const AUTO_REPLY = 1 << 4;
		const ADR = 1 << 5;
		const SILENT_IMMEDIATELY = 1 << 6;
		const MAC_PAUSED = 1 << 7;
		const RX_DONE = 1 << 8;
		const LINK_CHECK = 1 << 9;
		const CHANNELS_UPDATED = 1 << 10;
		const OUTPUT_POWER_UPDATED = 1 << 11;
		const NB_REP_UPDATED = 1 << 12;
		const PRESCALER_UPDATED = 1 << 13;
		const RX2_UPDATED = 1 << 14;
		const RX_TIMING_UPDATED = 1 << 15;
		const REJOIN_NEEDED = 1 << 16;
		const MULTICAST = 1 << 17;
	}
}

/// MAC state field carried in bits 1..=3 of the status word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MacState {
	Idle,
	TransmissionOccurring,
	BeforeRx1,
	Rx1Open,
	BetweenRx1AndRx2,
	Rx2Open,
	RetransmissionDelay,
	AbpDelay,
}

impl MacStatus {
	pub fn mac_state(&self) -> MacState {
		match (self.bits() >> 1) & 0b111 {
			0 => MacState::Idle,
			1 => MacState::TransmissionOccurring,
			2 => MacState::BeforeRx1,
			3 => MacState::Rx1Open,
			4 => MacState::BetweenRx1AndRx2,
			5 => MacState::Rx2Open,
			6 => MacState::RetransmissionDelay,
			_ => MacState::AbpDelay,
		}
	}
}
