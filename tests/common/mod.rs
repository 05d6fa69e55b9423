#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Error, ErrorKind};
use std::rc::Rc;

use at_proto::{Connect, LineChannel};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Simulated AT device on the far end of a serial line.
///
/// Every complete line written to it is looked up in the reply table and
/// the reply is queued for reading. Reads hand out at most `chunk` bytes at a
/// time and time out once the queue is empty.
pub struct SimDevice {
    replies: HashMap<String, Vec<u8>>,
    rx: Vec<u8>,
    tx: VecDeque<u8>,
    pub received: Vec<String>,
    pub chunk: usize,
    pub reads: usize,
    do_read_error: bool,
    do_write_error: bool,
}

impl SimDevice {
    pub fn new() -> Rc<RefCell<SimDevice>> {
        Rc::new(RefCell::new(SimDevice {
            replies: HashMap::new(),
            rx: Vec::new(),
            tx: VecDeque::new(),
            received: Vec::new(),
            chunk: 5,
            reads: 0,
            do_read_error: false,
            do_write_error: false,
        }))
    }

    /// An HM-10 style module with the usual firmware answers.
    pub fn hm10() -> Rc<RefCell<SimDevice>> {
        let dev = SimDevice::new();
        {
            let mut d = dev.borrow_mut();
            d.reply("AT", b"OK\r\n");
            d.reply(
                "AT+HELP",
                b"********************************************************************\r\n\
                  * Command             Description\r\n\
                  * ----------------------------------------------------------------\r\n\
                  * AT                  Check if the command terminal work normally\r\n\
                  * AT+RESET            Software reboot\r\n\
                  * AT+VERSION          Get firmware, bluetooth, HCI and LMP version\r\n\
                  * AT+NAME             Get/Set local device name\r\n\
                  * AT+PIN              Get/Set pin code for pairing\r\n\
                  * AT+IMME             Get/Set work mode\r\n\
                  ********************************************************************\r\n",
            );
            d.reply("AT+IMME?", b"OK+Get:0\r\n");
            d.reply("AT+NAME", b"OK+NAME:HMSoft\r\n");
        }
        dev
    }

    pub fn reply(&mut self, command: &str, reply: &[u8]) {
        self.replies.insert(command.to_owned(), reply.to_vec());
    }

    /// Queue data the device sends without being asked.
    pub fn push_unsolicited(&mut self, data: &[u8]) {
        self.tx.extend(data);
    }

    pub fn trigger_write_error(&mut self) {
        self.do_write_error = true;
    }

    pub fn trigger_read_error(&mut self) {
        self.do_read_error = true;
    }

    fn receive(&mut self, data: &[u8]) {
        self.rx.extend_from_slice(data);
        while let Some(pos) = self.rx.windows(2).position(|w| w == b"\r\n") {
            let line: Vec<u8> = self.rx.drain(..pos + 2).collect();
            let command = String::from_utf8_lossy(&line[..pos]).into_owned();
            if let Some(reply) = self.replies.get(&command) {
                self.tx.extend(reply.iter().copied());
            }
            self.received.push(command);
        }
    }
}

/// The host side of the serial line to a [`SimDevice`].
pub struct SimPort(Rc<RefCell<SimDevice>>);

impl SimPort {
    pub fn new(device: &Rc<RefCell<SimDevice>>) -> SimPort {
        SimPort(Rc::clone(device))
    }
}

impl io::Read for SimPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inner = self.0.borrow_mut();
        inner.reads += 1;
        if inner.do_read_error {
            inner.do_read_error = false;
            return Err(Error::new(ErrorKind::BrokenPipe, "IO read error"));
        }
        if inner.tx.is_empty() {
            return Err(Error::new(ErrorKind::TimedOut, "IO read timeout"));
        }
        let len = inner.chunk.min(buf.len()).min(inner.tx.len());
        for (dst, src) in buf.iter_mut().zip(inner.tx.drain(..len)) {
            *dst = src;
        }
        Ok(len)
    }
}

impl io::Write for SimPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.0.borrow_mut();
        if inner.do_write_error {
            inner.do_write_error = false;
            Err(Error::new(ErrorKind::PermissionDenied, "IO write error"))
        } else {
            inner.receive(buf);
            Ok(buf.len())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Connector handing out [`SimPort`]s, or failing like a missing device.
pub struct SimConnector {
    pub device: Rc<RefCell<SimDevice>>,
    pub present: bool,
    pub connects: usize,
}

impl SimConnector {
    pub fn new(device: &Rc<RefCell<SimDevice>>) -> SimConnector {
        SimConnector {
            device: Rc::clone(device),
            present: true,
            connects: 0,
        }
    }

    pub fn absent() -> SimConnector {
        SimConnector {
            present: false,
            ..SimConnector::new(&SimDevice::new())
        }
    }
}

impl Connect for SimConnector {
    type Channel = LineChannel<SimPort>;

    fn port_name(&self) -> &str {
        "/dev/ttySIM0"
    }

    fn connect(&mut self) -> io::Result<Self::Channel> {
        if !self.present {
            return Err(Error::new(ErrorKind::NotFound, "No such file or directory"));
        }
        self.connects += 1;
        Ok(LineChannel::new(SimPort::new(&self.device)))
    }
}
