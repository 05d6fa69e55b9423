use std::io::{self, Write};
use std::iter::Peekable;
use std::str::SplitWhitespace;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use at_proto::serial::{DEFAULT_BAUD_RATE, SerialConfig};
use at_proto::{Connect, Session};

type HmSession = Session<SerialConfig>;

fn cmd_caps(session: &mut HmSession) -> Result<()> {
    let caps = session.list_capabilities();
    if caps.is_empty() {
        println!("Device listed no commands");
    } else {
        print!("{}", caps);
    }
    Ok(())
}

fn cmd_mode(session: &mut HmSession) -> Result<()> {
    let mode = session.query_work_mode();
    println!(
        "status: {}, work mode: {}",
        mode.status().unwrap_or("-"),
        mode.parameter().unwrap_or("-")
    );
    Ok(())
}

fn cmd_send(args: &mut CmdScanner, session: &mut HmSession) -> Result<()> {
    let opcode = args.next()?;
    match session.send_if_supported(opcode) {
        Some(reply) if reply.is_empty() => println!("No data received"),
        Some(reply) => print!("{}", reply),
        None => println!("{} is not in the device's command list, use raw to force it", opcode),
    }
    Ok(())
}

fn cmd_raw(args: &mut CmdScanner, session: &mut HmSession) -> Result<()> {
    let text = args.rest()?;
    let reply = session.execute(text.as_str());
    if reply.is_empty() {
        println!("No data received");
    } else {
        print!("{}", reply);
    }
    Ok(())
}

fn run(session: &mut HmSession) -> Result<()> {
    session
        .open()
        .with_context(|| format!("Cannot talk to {}", session.connector().port_name()))?;

    // The module sometimes needs a moment after the port opens.
    if !session.wait_until_alive(3, Duration::from_millis(500)) {
        bail!("Device did not answer AT with OK");
    }
    cmd_caps(session)?;
    cmd_mode(session)?;

    let mut stdout = io::stdout();
    loop {
        print!(">> ");
        stdout.flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let mut scan = CmdScanner::new(&line);
        if let Err(err) = match scan.next() {
            Err(_) => continue,
            Ok("help") | Ok("caps") => cmd_caps(session),
            Ok("mode") => cmd_mode(session),
            Ok("send") | Ok("s") => cmd_send(&mut scan, session),
            Ok("raw") => cmd_raw(&mut scan, session),
            Ok("quit") | Ok("q") => break,
            Ok(cmd) => {
                println!("Unknown command {}", cmd);
                continue;
            }
        } {
            println!("{:?}", err)
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args();
    args.next(); // Skip program name
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let baud_rate = match args.next() {
        Some(baud) => baud.parse().context("Invalid baud rate")?,
        None => DEFAULT_BAUD_RATE,
    };

    let mut session = Session::new(SerialConfig::new(port, baud_rate));
    let result = run(&mut session);
    session.close();
    result
}

struct CmdScanner<'a> {
    splt: Peekable<SplitWhitespace<'a>>,
}

impl<'a> CmdScanner<'a> {
    fn new(line: &'a str) -> Self {
        let splt = line.split_whitespace().peekable();
        Self { splt }
    }
    fn next(&mut self) -> Result<&'a str> {
        self.splt.next().context("End of stream")
    }
    fn rest(&mut self) -> Result<String> {
        self.splt.peek().context("Missing argument")?;
        Ok(self.splt.by_ref().collect::<Vec<_>>().join(" "))
    }
}
