//! Network driver with a prioritized send queue
//!
//! Handlers submit outbound frames here; a background writer task wraps
//! each one in serial-API and link framing and pushes it down the link.
//! Submission is synchronous and never blocks, and frames within one
//! priority lane leave in submission order.

use anyhow::{anyhow, Result};
use meshwave_shared::{codec, func, HomeId, OutboundFrame, DEFAULT_TX_OPTIONS};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error};

use super::traits::{ControllerDriver, SendPriority};

/// Configuration for the network driver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Identifier of the network this controller was included into
    pub home_id: HomeId,
    /// Initial transmit options handed to the radio
    pub tx_options: u8,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            home_id: 0,
            tx_options: DEFAULT_TX_OPTIONS,
        }
    }
}

/// A frame waiting in the send queue
#[derive(Debug)]
struct QueuedFrame {
    frame: OutboundFrame,
    priority: SendPriority,
}

/// Owns the send queue and the write half of the link
pub struct NetworkDriver {
    home_id: HomeId,
    tx_options: AtomicU8,
    queue_tx: mpsc::UnboundedSender<QueuedFrame>,
}

impl NetworkDriver {
    /// Start the driver over the write half of an established link
    pub fn start<W>(config: DriverConfig, link: W) -> Arc<Self>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            writer_loop(link, queue_rx).await;
        });

        Arc::new(Self {
            home_id: config.home_id,
            tx_options: AtomicU8::new(config.tx_options),
            queue_tx,
        })
    }

    /// Adjust the transmit options as network conditions change
    pub fn set_transmit_options(&self, options: u8) {
        self.tx_options.store(options, Ordering::Relaxed);
    }
}

impl ControllerDriver for NetworkDriver {
    fn home_id(&self) -> HomeId {
        self.home_id
    }

    fn transmit_options(&self) -> u8 {
        self.tx_options.load(Ordering::Relaxed)
    }

    fn submit(&self, frame: OutboundFrame, priority: SendPriority) -> Result<()> {
        self.queue_tx
            .send(QueuedFrame { frame, priority })
            .map_err(|_| anyhow!("Driver send queue closed"))
    }
}

fn lane(priority: SendPriority) -> usize {
    match priority {
        SendPriority::Urgent => 0,
        SendPriority::Normal => 1,
        SendPriority::Poll => 2,
    }
}

/// Index of the first non-empty lane, urgent first
fn next_lane(lanes: &[VecDeque<OutboundFrame>; 3]) -> Option<usize> {
    lanes.iter().position(|lane| !lane.is_empty())
}

/// Drains the send queue into the link, urgent lane first
async fn writer_loop<W>(mut link: W, mut queue_rx: mpsc::UnboundedReceiver<QueuedFrame>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut lanes: [VecDeque<OutboundFrame>; 3] = Default::default();

    loop {
        // Wait for work if every lane is empty
        if next_lane(&lanes).is_none() {
            match queue_rx.recv().await {
                Some(queued) => lanes[lane(queued.priority)].push_back(queued.frame),
                None => break,
            }
        }

        // Pull in anything else already queued so priorities can reorder
        while let Ok(queued) = queue_rx.try_recv() {
            lanes[lane(queued.priority)].push_back(queued.frame);
        }

        let Some(frame) = next_lane(&lanes).and_then(|idx| lanes[idx].pop_front()) else {
            continue;
        };

        if let Err(e) = write_frame(&mut link, &frame).await {
            error!("Link write failed, driver stopping: {}", e);
            break;
        }

        debug!(node = frame.target(), "frame written to link");
    }
}

async fn write_frame<W>(link: &mut W, frame: &OutboundFrame) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut payload = Vec::with_capacity(1 + frame.as_bytes().len());
    payload.push(func::SEND_DATA);
    payload.extend_from_slice(frame.as_bytes());

    let encoded = codec::encode_frame(&payload)?;
    link.write_all(&encoded).await?;
    link.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshwave_shared::{command_class, FrameDecoder};
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_lane_order() {
        let mut lanes: [VecDeque<OutboundFrame>; 3] = Default::default();
        assert_eq!(next_lane(&lanes), None);

        let frame = OutboundFrame::command(1, command_class::SCENE_ACTIVATION, 0x01, &[2], 0x25);
        lanes[lane(SendPriority::Poll)].push_back(frame.clone());
        assert_eq!(next_lane(&lanes), Some(2));

        lanes[lane(SendPriority::Normal)].push_back(frame.clone());
        assert_eq!(next_lane(&lanes), Some(1));

        lanes[lane(SendPriority::Urgent)].push_back(frame);
        assert_eq!(next_lane(&lanes), Some(0));
    }

    #[tokio::test]
    async fn test_submitted_frame_reaches_link_wrapped() {
        let (near, far) = tokio::io::duplex(256);
        let (_, write_half) = tokio::io::split(near);
        let (mut far_read, _far_write) = tokio::io::split(far);

        let driver = NetworkDriver::start(
            DriverConfig {
                home_id: 0x00c0ffee,
                tx_options: 0x25,
            },
            write_half,
        );

        let frame = OutboundFrame::command(9, command_class::SCENE_ACTIVATION, 0x01, &[5], 0x25);
        driver
            .submit(frame, SendPriority::Normal)
            .expect("submit failed");

        let mut decoder = FrameDecoder::new();
        let mut buf = [0u8; 64];
        let payload = loop {
            let n = far_read.read(&mut buf).await.expect("link read failed");
            decoder.extend(&buf[..n]);
            if let Some(payload) = decoder.decode_next().expect("bad frame on link") {
                break payload;
            }
        };

        assert_eq!(&payload[..], &[func::SEND_DATA, 9, 3, 0x2b, 0x01, 5, 0x25]);
    }

    #[tokio::test]
    async fn test_transmit_options_not_cached() {
        let (near, _far) = tokio::io::duplex(256);
        let (_, write_half) = tokio::io::split(near);

        let driver = NetworkDriver::start(DriverConfig::default(), write_half);
        assert_eq!(driver.transmit_options(), DEFAULT_TX_OPTIONS);

        driver.set_transmit_options(0x05);
        assert_eq!(driver.transmit_options(), 0x05);
    }
}
