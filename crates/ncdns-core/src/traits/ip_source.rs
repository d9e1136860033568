// # IP Source Trait
//
// Defines the interface for discovering this host's public IP address.
// The registrar only accepts calls from whitelisted client IPs and wants
// that IP repeated on every request.
//
// ## Implementations
//
// - HTTP-based: `ncdns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ncdns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//     let client_ip = source.current().await?;
//     println!("Using client IP {client_ip}");
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP source implementations
///
/// Resolution happens once at startup; the result is passed into the
/// registrar configuration explicitly.
///
/// Implementations must bound their own latency (a few seconds) so that a
/// slow discovery service never blocks startup indefinitely.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current IP address
    /// - `Err(Error)`: If unable to determine the current IP
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
