//! Driver and link trait abstractions

use anyhow::Result;
use async_trait::async_trait;
use meshwave_shared::{HomeId, OutboundFrame};
use tokio::io::{AsyncRead, AsyncWrite};

/// Delivery lanes of the driver's send queue, drained in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPriority {
    /// Safety-relevant traffic that jumps the queue
    Urgent,
    /// Regular command traffic
    Normal,
    /// Background polling
    Poll,
}

/// The driver interface consumed by command class handlers
///
/// Acknowledgement, retransmission and failure escalation all live
/// behind `submit`; callers hand a frame over and never see it again.
pub trait ControllerDriver: Send + Sync {
    /// Identifier of the network this controller belongs to
    fn home_id(&self) -> HomeId;

    /// Current transmit options. May change with network conditions, so
    /// read it at frame-construction time rather than caching it.
    fn transmit_options(&self) -> u8;

    /// Queue a frame for delivery on the given lane
    fn submit(&self, frame: OutboundFrame, priority: SendPriority) -> Result<()>;
}

/// A byte pipe to the radio hardware
#[async_trait]
pub trait Link: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Close the link gracefully
    async fn shutdown(&mut self) -> Result<()>;
}

/// Factory for establishing a link
#[async_trait]
pub trait LinkConnector: Send + Sync {
    /// The stream type this connector produces
    type Stream: Link;

    /// Attempt to open the link, returning a stream on success
    async fn connect(&self) -> Result<Self::Stream>;

    /// Human-readable name for this link type
    fn name(&self) -> &'static str;
}
