//! Serial link to a radio module on a local port

use anyhow::Result;
use async_trait::async_trait;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use super::traits::{Link, LinkConnector};

/// Default baud rate for attached radio modules
pub const DEFAULT_BAUD: u32 = 115_200;

#[async_trait]
impl Link for SerialStream {
    async fn shutdown(&mut self) -> Result<()> {
        tokio::io::AsyncWriteExt::shutdown(self).await?;
        Ok(())
    }
}

/// Connector for a radio module attached to a serial device
pub struct SerialConnector {
    path: String,
    baud: u32,
}

impl SerialConnector {
    pub fn new(path: String) -> Self {
        Self {
            path,
            baud: DEFAULT_BAUD,
        }
    }

    pub fn with_baud(path: String, baud: u32) -> Self {
        Self { path, baud }
    }
}

#[async_trait]
impl LinkConnector for SerialConnector {
    type Stream = SerialStream;

    async fn connect(&self) -> Result<Self::Stream> {
        let stream = tokio_serial::new(&self.path, self.baud).open_native_async()?;
        Ok(stream)
    }

    fn name(&self) -> &'static str {
        "Serial"
    }
}
