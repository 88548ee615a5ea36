//! Socket establishment for the uplink client.

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;

use crate::config::UplinkConfig;
use crate::error::ConnectError;

/// Resolve the configured host and open a TCP connection to it.
///
/// Applies socket options and transmits the handshake payload before
/// returning. A failed handshake send leaves the connection up; the
/// failure surfaces on the first real write if the socket is actually
/// gone.
pub(crate) async fn establish(config: &UplinkConfig) -> Result<TcpStream, ConnectError> {
    let addr = lookup_host((config.host.as_str(), config.port))
        .await
        .map_err(|e| ConnectError::Resolve {
            host: config.host.clone(),
            source: e,
        })?
        .next()
        .ok_or_else(|| ConnectError::NoAddresses {
            host: config.host.clone(),
        })?;

    let mut stream = match config.socket.connect_timeout {
        Some(timeout_duration) => match timeout(timeout_duration, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(ConnectError::Connect { addr, source: e }),
            Err(_) => return Err(ConnectError::Timeout { addr }),
        },
        None => TcpStream::connect(addr)
            .await
            .map_err(|e| ConnectError::Connect { addr, source: e })?,
    };

    if let Err(e) = stream.set_nodelay(config.socket.no_delay) {
        tracing::warn!(target: "horizon_uplink::connect", "Failed to set TCP_NODELAY: {}", e);
    }

    if let Some(handshake) = &config.handshake
        && let Err(e) = stream.write_all(handshake).await
    {
        tracing::warn!(target: "horizon_uplink::connect", "Handshake send to {} failed: {}", addr, e);
    }

    tracing::debug!(target: "horizon_uplink::connect", "Connected to {}", addr);

    Ok(stream)
}
