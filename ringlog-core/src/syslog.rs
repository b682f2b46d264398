//! Remote syslog sink.
//!
//! Every call dials the configured transport, writes a single RFC 3164 style
//! line and closes the connection again. The priority is fixed at
//! WARNING | LOCAL0 whatever the severity of the call; the severity is still
//! visible in the `[SEVERITY]` tag of the body.

use std::{
    io::{self, Write},
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket},
    process,
    str::FromStr,
};

use chrono::{DateTime, Local, SecondsFormat};

use crate::{
    config::SyslogConfig,
    error::{Error, Result},
    log_writer::{LogLine, LogWriter},
    utils::hostname,
};

const SEVERITY_WARNING: u8 = 4;
const FACILITY_LOCAL0: u8 = 16 << 3;
pub const SYSLOG_PRIORITY: u8 = FACILITY_LOCAL0 | SEVERITY_WARNING;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
}

impl FromStr for Transport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "udp" | "udp4" | "udp6" => Ok(Transport::Udp),
            "tcp" | "tcp4" | "tcp6" => Ok(Transport::Tcp),
            other => Err(Error::UnsupportedTransport(other.into())),
        }
    }
}

pub struct LogSyslog {
    transport: String,
    port: i64,
    endpoint: String,
    tag: String,
    hostname: String,
}

impl LogSyslog {
    pub fn new(config: &SyslogConfig, tag: &str) -> Self {
        Self {
            transport: config.transport.clone(),
            port: config.port,
            endpoint: config.endpoint(),
            tag: tag.into(),
            hostname: hostname(),
        }
    }

    /// `<PRI>TIMESTAMP HOST TAG[PID]: BODY`, newline-terminated.
    pub fn frame(&self, body: &str, now: DateTime<Local>) -> String {
        let newline = if body.ends_with('\n') { "" } else { "\n" };
        format!(
            "<{SYSLOG_PRIORITY}>{} {} {}[{}]: {body}{newline}",
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.hostname,
            self.tag,
            process::id(),
        )
    }

    fn dial_error(&self, source: io::Error) -> Error {
        Error::SyslogDial {
            address: self.endpoint.clone(),
            source,
        }
    }

    fn send(&self, transport: Transport, frame: &str) -> Result<()> {
        if u16::try_from(self.port).is_err() {
            return Err(self.dial_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("port {} out of range", self.port),
            )));
        }
        match transport {
            Transport::Udp => {
                let target = self
                    .endpoint
                    .to_socket_addrs()
                    .map_err(|e| self.dial_error(e))?
                    .next()
                    .ok_or_else(|| {
                        self.dial_error(io::Error::new(
                            io::ErrorKind::NotFound,
                            "address resolved to nothing",
                        ))
                    })?;
                let local: SocketAddr = if target.is_ipv4() {
                    (Ipv4Addr::UNSPECIFIED, 0).into()
                } else {
                    (Ipv6Addr::UNSPECIFIED, 0).into()
                };
                let socket = UdpSocket::bind(local).map_err(|e| self.dial_error(e))?;
                socket.connect(target).map_err(|e| self.dial_error(e))?;
                socket.send(frame.as_bytes()).map_err(Error::SyslogWrite)?;
            }
            Transport::Tcp => {
                let mut stream =
                    TcpStream::connect(self.endpoint.as_str()).map_err(|e| self.dial_error(e))?;
                stream
                    .write_all(frame.as_bytes())
                    .and_then(|_| stream.flush())
                    .map_err(Error::SyslogWrite)?;
            }
        }
        Ok(())
    }
}

impl LogWriter for LogSyslog {
    fn write(&self, line: &LogLine) -> Result<()> {
        let transport = self.transport.parse::<Transport>()?;
        let frame = self.frame(&line.body(), Local::now());
        self.send(transport, &frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use std::{
        io::Read,
        net::{TcpListener, UdpSocket},
        thread,
        time::Duration,
    };

    fn config(transport: &str, port: u16) -> SyslogConfig {
        SyslogConfig {
            enabled: true,
            transport: transport.into(),
            address: "127.0.0.1".into(),
            port: port.into(),
        }
    }

    #[test]
    fn test_priority_is_warning_local0() {
        assert_eq!(SYSLOG_PRIORITY, 132);
    }

    #[test]
    fn test_frame_layout() {
        let sink = LogSyslog::new(&config("udp", 514), "run-42");
        let frame = sink.frame("[ERROR] [app::main]boom", Local::now());
        let pattern = regex::Regex::new(&format!(
            r"^<132>\d{{4}}-\d{{2}}-\d{{2}}T\d{{2}}:\d{{2}}:\d{{2}}(Z|[+-]\d{{2}}:\d{{2}}) \S+ run-42\[{}\]: \[ERROR\] \[app::main\]boom\n$",
            process::id()
        ))
        .unwrap();
        assert!(pattern.is_match(&frame), "{frame}");
        assert!(sink.frame("already\n", Local::now()).ends_with("already\n"));
        assert!(!sink.frame("already\n", Local::now()).ends_with("\n\n"));
    }

    #[test]
    fn test_udp_delivery_without_timestamp_prefix() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let port = server.local_addr().unwrap().port();

        let sink = LogSyslog::new(&config("udp", port), "udp-test");
        sink.write(&LogLine::new(Severity::Debug, "a::b", "over udp"))
            .unwrap();

        let mut buf = [0u8; 1024];
        let n = server.recv(&mut buf).unwrap();
        let received = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(received.starts_with("<132>"), "{received}");
        assert!(received.contains(" udp-test["), "{received}");
        assert!(received.ends_with(": [DEBUG] [a::b]over udp\n"), "{received}");
    }

    #[test]
    fn test_tcp_delivery_closes_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = String::new();
            // returns once the sink closes its side
            stream.read_to_string(&mut received).unwrap();
            received
        });

        let sink = LogSyslog::new(&config("tcp", port), "tcp-test");
        sink.write(&LogLine::new(Severity::Info, "a::b", "over tcp"))
            .unwrap();

        let received = server.join().unwrap();
        assert!(received.starts_with("<132>"));
        assert!(received.contains(" tcp-test["));
        assert!(received.ends_with("]: [INFO] [a::b]over tcp\n"));
    }

    #[test]
    fn test_refused_connection_is_an_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let sink = LogSyslog::new(&config("tcp", port), "refused");
        let result = sink.write(&LogLine::new(Severity::Info, "a::b", "lost"));
        assert!(matches!(result, Err(Error::SyslogDial { .. })));
    }

    #[test]
    fn test_out_of_range_port_fails_the_dial() {
        for port in [70_000, -1] {
            let sink = LogSyslog::new(
                &SyslogConfig {
                    port,
                    ..config("udp", 0)
                },
                "x",
            );
            let result = sink.write(&LogLine::new(Severity::Info, "a::b", "lost"));
            assert!(matches!(result, Err(Error::SyslogDial { .. })), "port {port}");
        }
    }

    #[test]
    fn test_unsupported_transport() {
        let sink = LogSyslog::new(&config("carrier-pigeon", 514), "x");
        let result = sink.write(&LogLine::new(Severity::Info, "a::b", "lost"));
        assert!(matches!(result, Err(Error::UnsupportedTransport(t)) if t == "carrier-pigeon"));
        assert_eq!("tcp6".parse::<Transport>().unwrap(), Transport::Tcp);
    }
}
