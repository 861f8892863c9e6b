//! TCP link for development against a simulated radio

use anyhow::Result;
use async_trait::async_trait;
use tokio::net::TcpStream;

use super::traits::{Link, LinkConnector};

#[async_trait]
impl Link for TcpStream {
    async fn shutdown(&mut self) -> Result<()> {
        tokio::io::AsyncWriteExt::shutdown(self).await?;
        Ok(())
    }
}

/// Connector for a radio simulator listening on a TCP address
pub struct TcpConnector {
    address: String,
}

impl TcpConnector {
    pub fn new(address: String) -> Self {
        Self { address }
    }
}

#[async_trait]
impl LinkConnector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self) -> Result<Self::Stream> {
        let stream = TcpStream::connect(&self.address).await?;
        Ok(stream)
    }

    fn name(&self) -> &'static str {
        "TCP simulation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_connector_opens_link() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
        let addr = listener.local_addr().expect("no local addr");

        let connector = TcpConnector::new(addr.to_string());
        assert_eq!(connector.name(), "TCP simulation");

        let (stream, accepted) =
            tokio::join!(connector.connect(), async { listener.accept().await });
        let mut stream = stream.expect("connect failed");
        accepted.expect("accept failed");

        stream.shutdown().await.expect("shutdown failed");
    }
}
