//! Link and driver plumbing between the dispatcher and the radio

mod driver;
mod serial;
mod tcp;
mod traits;

pub use driver::{DriverConfig, NetworkDriver};
pub use serial::{SerialConnector, DEFAULT_BAUD};
pub use tcp::TcpConnector;
pub use traits::{ControllerDriver, Link, LinkConnector, SendPriority};
