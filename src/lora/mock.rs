use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use super::{Config, Region, Rn2xx3, Transport};
use crate::Result;

pub(crate) const VERSION: &str = "RN2903 1.0.5 Nov 06 2018 10:45:27";

/// Scripted module: answers each read with the next queued reply, or a timeout once
/// the script runs out.
#[derive(Default)]
pub(crate) struct MockTransport {
	pub replies: VecDeque<String>,
	pub written: Vec<String>,
	pub delays: Vec<Duration>,
	mirror: Option<Rc<RefCell<Vec<String>>>>,
}

impl MockTransport {
	pub fn new(replies: &[&str]) -> MockTransport {
		MockTransport { replies: replies.iter().map(|r| r.to_string()).collect(), ..MockTransport::default() }
	}

	/// Log of written lines that outlives the driver, for checking what it sends on drop.
	pub fn shared_log(&mut self) -> Rc<RefCell<Vec<String>>> {
		let log = Rc::new(RefCell::new(Vec::new()));
		self.mirror = Some(log.clone());
		log
	}
}

impl Transport for MockTransport {
	fn write_line(&mut self, line: &str) -> Result<()> {
		self.written.push(line.to_string());
		if let Some(mirror) = &self.mirror {
			mirror.borrow_mut().push(line.to_string());
		}
		Ok(())
	}

	fn read_line(&mut self) -> Result<String> {
		Ok(self.replies.pop_front().unwrap_or_default())
	}

	fn delay(&mut self, duration: Duration) {
		self.delays.push(duration);
	}
}

/// Manual mode driver past its initialization, with `replies` queued and the write log cleared.
pub(crate) fn driver(region: Region, replies: &[&str]) -> Rn2xx3<MockTransport> {
	let mut init = vec![VERSION];
	init.extend(["ok"; 6]);
	let config = Config { region, ..Config::default() };
	let mut lora = Rn2xx3::new(MockTransport::new(&init), &config).unwrap();
	let transport = lora.transport_mut();
	transport.written.clear();
	transport.delays.clear();
	transport.replies.extend(replies.iter().map(|r| r.to_string()));
	lora
}
