use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Upper bound on a single connection attempt.
pub const PORT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum PortError {
    #[error("Unable to find free port. Starting port {start} and ending port {end}")]
    Exhausted { start: u16, end: u16 },
}

/// Whether something on localhost accepts connections on `port`.
///
/// Any connection error or a timeout counts as not bound.
pub async fn port_bound(port: u16) -> bool {
    matches!(
        timeout(PORT_CHECK_TIMEOUT, TcpStream::connect(("localhost", port))).await,
        Ok(Ok(_))
    )
}

/// First port in `start..end` nobody is listening on.
pub async fn find_port(start: u16, end: u16) -> Result<u16, PortError> {
    for port in start..end {
        if !port_bound(port).await {
            return Ok(port);
        }
    }
    Err(PortError::Exhausted { start, end })
}
