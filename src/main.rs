mod command;
mod event;
mod transport;
mod value;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use command::handlers::SceneActivation;
use command::CommandDispatcher;
use event::{Event, EventBus};
use meshwave_shared::{ApplicationCommand, FrameDecoder};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use transport::{
    DriverConfig, LinkConnector, NetworkDriver, SerialConnector, TcpConnector, DEFAULT_BAUD,
};

/// How the node reaches its radio
enum LinkMode {
    Serial { path: String, baud: u32 },
    Tcp { address: String },
}

struct NodeConfig {
    driver: DriverConfig,
    link: LinkMode,
}

impl NodeConfig {
    /// Assemble configuration from the environment
    fn from_env() -> Self {
        let mut driver = DriverConfig::default();
        if let Some(home_id) = std::env::var("MESHWAVE_HOME_ID")
            .ok()
            .and_then(|v| u32::from_str_radix(v.trim_start_matches("0x"), 16).ok())
        {
            driver.home_id = home_id;
        }

        let link = match std::env::var("MESHWAVE_SERIAL") {
            Ok(path) => LinkMode::Serial {
                path,
                baud: std::env::var("MESHWAVE_SERIAL_BAUD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_BAUD),
            },
            Err(_) => LinkMode::Tcp {
                address: std::env::var("MESHWAVE_LINK_ADDR")
                    .unwrap_or_else(|_| "127.0.0.1:9600".into()),
            },
        };

        Self { driver, link }
    }
}

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

async fn open_link(mode: &LinkMode) -> Result<(BoxedReader, BoxedWriter)> {
    match mode {
        LinkMode::Serial { path, baud } => {
            let connector = SerialConnector::with_baud(path.clone(), *baud);
            info!("Opening {} link on {}", connector.name(), path);
            let (reader, writer) = tokio::io::split(connector.connect().await?);
            Ok((Box::new(reader), Box::new(writer)))
        }
        LinkMode::Tcp { address } => {
            let connector = TcpConnector::new(address.clone());
            info!("Opening {} link to {}", connector.name(), address);
            let (reader, writer) = tokio::io::split(connector.connect().await?);
            Ok((Box::new(reader), Box::new(writer)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = NodeConfig::from_env();
    info!(
        "Controller node starting: home id {:#010x}",
        config.driver.home_id
    );

    let (reader, writer) = open_link(&config.link).await?;

    let (bus, events) = EventBus::new();
    let driver = NetworkDriver::start(config.driver.clone(), writer);

    let mut dispatcher = CommandDispatcher::new(driver, bus);
    dispatcher.register(Arc::new(SceneActivation));

    tokio::spawn(consume_events(events));

    inbound_loop(reader, &dispatcher).await
}

/// Log published domain events; a real deployment hangs UI and
/// automation subscribers off this receiver instead
async fn consume_events(mut events: mpsc::UnboundedReceiver<Event>) {
    while let Some(event) = events.recv().await {
        match event {
            Event::SceneActivated {
                home_id,
                node_id,
                scene_id,
            } => {
                info!(
                    node = node_id,
                    scene = scene_id,
                    "Scene activated in network {:#010x}",
                    home_id
                );
            }
        }
    }
}

/// Read link frames and feed application commands to the dispatcher
async fn inbound_loop<R>(mut link: R, dispatcher: &CommandDispatcher) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut read_buf = vec![0u8; 256];

    loop {
        let n = link.read(&mut read_buf).await?;
        if n == 0 {
            return Err(anyhow!("Link closed"));
        }
        decoder.extend(&read_buf[..n]);

        // Drain every complete frame that has arrived
        loop {
            match decoder.decode_next() {
                Ok(Some(frame)) => match ApplicationCommand::parse(&frame) {
                    Ok(Some(cmd)) => {
                        if !dispatcher.dispatch(&cmd).is_handled() {
                            debug!(
                                node = cmd.node_id,
                                class = cmd.command_class,
                                "No handler matched the command"
                            );
                        }
                    }
                    Ok(None) => {
                        debug!(
                            "Ignoring non-command function {:#04x}",
                            frame.first().copied().unwrap_or(0)
                        );
                    }
                    Err(e) => warn!("Dropping unparseable frame: {}", e),
                },
                Ok(None) => break,
                Err(e) => warn!("Link desynchronized: {}", e),
            }
        }
    }
}
