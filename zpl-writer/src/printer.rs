//! Printer adapters for sending ZPL data
//!
//! Zebra and compatible label printers accept raw ZPL on TCP port 9100.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

use crate::error::{ZplError, ZplResult};

/// Default raw printing port
pub const DEFAULT_PORT: u16 = 9100;

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send a complete label to the printer
    async fn print(&self, data: &[u8]) -> ZplResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Network printer (raw TCP)
///
/// Nothing is read back; a successful write is a successful print.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer; `host` may be a name or an IP
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT),
        }
    }

    /// Create from a `host:port` string (e.g., "192.168.1.100:9100")
    pub fn from_addr(addr: &str) -> ZplResult<Self> {
        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| ZplError::InvalidConfig(format!("Invalid address: {}", addr)))?;
        let port = port
            .parse()
            .map_err(|_| ZplError::InvalidConfig(format!("Invalid port: {}", addr)))?;
        if host.is_empty() {
            return Err(ZplError::InvalidConfig(format!("Missing host: {}", addr)));
        }
        Ok(Self::new(host, port))
    }

    /// Set connect and write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn connect(&self) -> ZplResult<TcpStream> {
        tokio::time::timeout(self.timeout, TcpStream::connect((self.host.as_str(), self.port)))
            .await
            .map_err(|_| {
                ZplError::Timeout(format!("Connection timeout: {}:{}", self.host, self.port))
            })?
            .map_err(|e| ZplError::Connection(format!("{}:{}: {}", self.host, self.port, e)))
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(self, data), fields(host = %self.host, port = self.port, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> ZplResult<()> {
        info!("Connecting to printer");

        let mut stream = self.connect().await?;

        info!("Connected, sending {} bytes", data.len());

        let write = async {
            stream.write_all(data).await?;
            stream.flush().await?;
            stream.shutdown().await
        };
        tokio::time::timeout(self.timeout, write)
            .await
            .map_err(|_| ZplError::Timeout(format!("Write timeout: {}:{}", self.host, self.port)))?
            .map_err(|e| {
                ZplError::Io(std::io::Error::new(e.kind(), format!("Write failed: {}", e)))
            })?;

        info!("Label sent successfully");
        Ok(())
    }

    #[instrument(skip(self), fields(host = %self.host, port = self.port))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match tokio::time::timeout(
            check_timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        {
            Ok(Ok(_)) => {
                info!("Printer online");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_printer_new() {
        let printer = NetworkPrinter::new("192.168.1.100", DEFAULT_PORT);
        assert_eq!(printer.port(), 9100);
        assert_eq!(printer.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_network_printer_from_addr() {
        let printer = NetworkPrinter::from_addr("zebra.local:6101").unwrap();
        assert_eq!(printer.host(), "zebra.local");
        assert_eq!(printer.port(), 6101);
    }

    #[test]
    fn test_invalid_addr() {
        assert!(NetworkPrinter::from_addr("invalid").is_err());
        assert!(NetworkPrinter::from_addr("host:notaport").is_err());
        assert!(NetworkPrinter::from_addr(":9100").is_err());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let printer = NetworkPrinter::new("127.0.0.1", port);
        let result = printer.print(b"^XA^XZ").await;
        assert!(matches!(result, Err(ZplError::Connection(_))));
        assert!(!printer.is_online().await);
    }
}
