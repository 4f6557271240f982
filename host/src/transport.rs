//! Delivers encoded poses to the controller over the serial link.
use std::io::Write;
use std::time::Duration;

use log::{debug, info, warn};
use quadruped_link::{encode, Pose};
use serialport::SerialPort;
use thiserror::Error;

/// Default serial device of a controller attached over USB.
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Upper bound on a single write before the port reports a failure.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum TransportError {
    /// The serial device could not be opened.
    #[error("Cannot open serial port {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// Writing the command line failed.
    #[error("Serial write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Anything that can carry a pose to the controller.
pub trait PoseSink {
    fn send(&mut self, pose: &Pose) -> Result<(), TransportError>;
}

/// Writes each pose as one newline-terminated command line.
#[derive(Debug)]
pub struct LineWriter<W> {
    writer: W,
}

impl<W: Write> LineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PoseSink for LineWriter<W> {
    fn send(&mut self, pose: &Pose) -> Result<(), TransportError> {
        let command = encode(pose);
        debug!("Serial send: {}", command);
        self.writer.write_all(command.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

type Opener<W> = Box<dyn FnMut(&str, u32) -> Result<W, serialport::Error>>;

/// Serial link to the controller, opened on first use.
///
/// A failed write drops the port, so the next send reopens the device.
/// Nothing is retried on its own.
pub struct SerialTransport<W = Box<dyn SerialPort>> {
    port_name: String,
    baud_rate: u32,
    open: Opener<W>,
    link: Option<LineWriter<W>>,
}

impl SerialTransport {
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self::with_opener(port_name, baud_rate, open_serial)
    }
}

impl<W: Write> SerialTransport<W> {
    /// Uses `open` instead of the serial driver to create the device handle.
    pub fn with_opener<F>(port_name: impl Into<String>, baud_rate: u32, open: F) -> Self
    where
        F: FnMut(&str, u32) -> Result<W, serialport::Error> + 'static,
    {
        Self {
            port_name: port_name.into(),
            baud_rate,
            open: Box::new(open),
            link: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    fn connect(&mut self) -> Result<&mut LineWriter<W>, TransportError> {
        let link = match self.link.take() {
            Some(link) => link,
            None => {
                let port = (self.open)(&self.port_name, self.baud_rate).map_err(|source| {
                    TransportError::Open {
                        port: self.port_name.clone(),
                        source,
                    }
                })?;
                info!("Opened {} at {} baud", self.port_name, self.baud_rate);
                LineWriter::new(port)
            }
        };
        Ok(self.link.insert(link))
    }
}

fn open_serial(port_name: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>, serialport::Error> {
    serialport::new(port_name, baud_rate)
        .timeout(WRITE_TIMEOUT)
        .data_bits(serialport::DataBits::Eight)
        .stop_bits(serialport::StopBits::One)
        .parity(serialport::Parity::None)
        .flow_control(serialport::FlowControl::None)
        .open()
}

impl<W: Write> PoseSink for SerialTransport<W> {
    fn send(&mut self, pose: &Pose) -> Result<(), TransportError> {
        let result = self.connect()?.send(pose);
        if let Err(e) = &result {
            warn!("Closing {} after failed write: {e}", self.port_name);
            self.link = None;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;

    /// Writer that refuses every byte.
    struct Unplugged;

    impl Write for Unplugged {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn send_writes_one_terminated_line() {
        let mut link = LineWriter::new(Vec::new());
        link.send(&Pose::new([10, 20, 30, 40, 50, 60, 70, 80]))
            .unwrap();
        assert_eq!(link.get_ref().as_slice(), b"10,20,30,40,50,60,70,80\n");
    }

    #[test]
    fn consecutive_sends_are_separate_lines() {
        let mut link = LineWriter::new(Vec::new());
        link.send(&Pose::splat(0)).unwrap();
        link.send(&Pose::splat(180)).unwrap();

        let written = String::from_utf8(link.into_inner()).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines, vec!["0,0,0,0,0,0,0,0", "180,180,180,180,180,180,180,180"]);
    }

    #[test]
    fn write_failure_is_surfaced() {
        let mut link = LineWriter::new(Unplugged);
        assert!(matches!(
            link.send(&Pose::default()),
            Err(TransportError::Write(_))
        ));
    }

    #[test]
    fn unavailable_device_is_reported() {
        let mut transport = SerialTransport::new("/dev/quadruped-does-not-exist", 115_200);
        let err = transport.send(&Pose::default()).unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
        assert!(err.to_string().contains("/dev/quadruped-does-not-exist"));
        assert!(!transport.is_open());
    }

    /// Handle returned by a test opener: dead or recording.
    enum Device {
        Unplugged(Unplugged),
        Plugged(Vec<u8>),
    }

    impl Write for Device {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            match self {
                Device::Unplugged(device) => device.write(buf),
                Device::Plugged(device) => device.write(buf),
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_closes_and_next_send_reopens() {
        let opens = Rc::new(Cell::new(0));
        let counter = Rc::clone(&opens);
        let mut transport = SerialTransport::with_opener("/dev/ttyACM0", 115_200, move |_, _| {
            counter.set(counter.get() + 1);
            Ok(match counter.get() {
                1 => Device::Unplugged(Unplugged),
                _ => Device::Plugged(Vec::new()),
            })
        });

        assert!(matches!(
            transport.send(&Pose::default()),
            Err(TransportError::Write(_))
        ));
        assert!(!transport.is_open());
        assert_eq!(opens.get(), 1);

        transport.send(&Pose::splat(45)).unwrap();
        assert!(transport.is_open());
        assert_eq!(opens.get(), 2);
        match transport.link.as_ref().map(LineWriter::get_ref) {
            Some(Device::Plugged(written)) => {
                assert_eq!(written.as_slice(), b"45,45,45,45,45,45,45,45\n")
            }
            _ => panic!("expected the reopened device"),
        }
    }

    #[test]
    fn open_port_is_reused() {
        let opens = Rc::new(Cell::new(0));
        let counter = Rc::clone(&opens);
        let mut transport = SerialTransport::with_opener("/dev/ttyACM0", 115_200, move |_, _| {
            counter.set(counter.get() + 1);
            Ok(Vec::<u8>::new())
        });

        transport.send(&Pose::default()).unwrap();
        transport.send(&Pose::default()).unwrap();
        assert_eq!(opens.get(), 1);
    }
}
