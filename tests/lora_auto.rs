use std::collections::VecDeque;
use std::time::Duration;

use lorahat::lora::{AutoConfig, Config, Received, Region, Rn2xx3, Transport, TxStatus};
use lorahat::{Error, Result};

/// Answers `ok` to every command unless a reply is queued, like a module that accepts
/// whatever it is told.
#[derive(Default)]
struct AgreeableModule {
	queued: VecDeque<String>,
	written: Vec<String>,
	slept: Duration,
}

impl AgreeableModule {
	fn queue(&mut self, line: &str) {
		self.queued.push_back(line.to_string());
	}
}

impl Transport for AgreeableModule {
	fn write_line(&mut self, line: &str) -> Result<()> {
		self.written.push(line.to_string());
		let reply = match line {
			"sys reset" => "RN2483 1.0.5 Oct 31 2018 15:06:52",
			"mac pause" => "4294967245",
			_ => "ok",
		};
		self.queued.push_front(reply.to_string());
		Ok(())
	}

	fn read_line(&mut self) -> Result<String> {
		Ok(self.queued.pop_front().unwrap_or_default())
	}

	fn delay(&mut self, duration: Duration) {
		self.slept += duration;
	}
}

fn config(auto_config: AutoConfig) -> Config {
	Config { region: Region::EuRn2483, auto_config, ..Config::default() }
}

#[test]
fn receiver_delivers_packets_and_keeps_listening() {
	let mut lora = Rn2xx3::new(AgreeableModule::default(), &config(AutoConfig::LoraRx)).unwrap();
	assert_eq!(lora.auto_config(), AutoConfig::LoraRx);
	assert!(lora.transport().written.contains(&"radio set freq 868000000".to_string()));
	assert!(lora.transport().slept >= Duration::from_millis(1000));

	lora.transport_mut().queue("radio_rx  54757274612C");
	match lora.check_data().unwrap() {
		Some(Received::Packet(packet)) => {
			assert_eq!(packet.payload, b"Turta,");
			assert_eq!(Received::Packet(packet).to_string(), "Turta,");
		}
		other => panic!("expected a packet, got {:?}", other),
	}
	assert_eq!(lora.transport().written.last().map(String::as_str), Some("sys set pindig GPIO1 1"));
	assert_eq!(lora.check_data().unwrap(), None);
}

#[test]
fn transmitter_reports_completion() {
	let mut lora = Rn2xx3::new(AgreeableModule::default(), &config(AutoConfig::LoraTx)).unwrap();
	// "ok" to `radio tx` comes first, the completion is read after it
	lora.transport_mut().queue("radio_tx_ok");
	let status = lora.send("ping");
	assert!(matches!(status, Ok(TxStatus::Transmitted)), "{:?}", status);
	assert!(lora.transport().written.contains(&"radio tx 70696E67".to_string()));
}

#[test]
fn manual_mode_exposes_command_families() {
	let mut lora = Rn2xx3::new(AgreeableModule::default(), &config(AutoConfig::Manual)).unwrap();
	lora.radio_set_pwr(-3).unwrap();
	lora.mac_set_pwridx(1).unwrap();
	assert!(matches!(lora.radio_set_pwr(20), Err(Error::InvalidArgument { .. })));
	assert_eq!(lora.send_raw("sys get vdd").unwrap(), "ok");
	assert_eq!(lora.region(), Region::EuRn2483);
}
