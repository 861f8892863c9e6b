//! Meshwave Shared Wire Format
//!
//! This crate provides the wire-format types and codec shared between the
//! controller node and any tooling that speaks the meshwave serial link:
//! link framing, application-command parsing, outbound command
//! construction and the protocol constant tables.

pub mod codec;
pub mod duration;

pub use codec::{ApplicationCommand, CodecError, FrameDecoder, OutboundFrame};
pub use duration::SceneDuration;

/// Identifier of a node within a network (1-232 on the wire, 0 unused).
pub type NodeId = u8;

/// Identifier of the network itself, assigned to the controller at
/// inclusion time and carried in every domain event.
pub type HomeId = u32;

/// Endpoint index used when a node exposes a single instance of a
/// command class.
pub const PRIMARY_INSTANCE: u8 = 1;

/// Command class identifiers understood by the controller
pub mod command_class {
    /// Scene Activation command class
    pub const SCENE_ACTIVATION: u8 = 0x2b;
}

/// Serial-API function identifiers carried as the first payload byte of
/// a link frame
pub mod func {
    /// An application command received from a remote node
    pub const APPLICATION_COMMAND: u8 = 0x04;

    /// A request to transmit an application command to a remote node
    pub const SEND_DATA: u8 = 0x13;
}

/// Transmit-option bits handed to the radio with every outbound command
pub mod tx {
    /// Request a link-layer acknowledgement from the target
    pub const ACK: u8 = 0x01;

    /// Transmit at low output power (target within a couple of meters)
    pub const LOW_POWER: u8 = 0x02;

    /// Allow routed delivery through intermediate nodes
    pub const AUTO_ROUTE: u8 = 0x04;

    /// Allow explorer-frame fallback when all known routes fail
    pub const EXPLORE: u8 = 0x20;
}

/// Default transmit options for a healthy network
pub const DEFAULT_TX_OPTIONS: u8 = tx::ACK | tx::AUTO_ROUTE | tx::EXPLORE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tx_options() {
        assert_ne!(DEFAULT_TX_OPTIONS & tx::ACK, 0);
        assert_ne!(DEFAULT_TX_OPTIONS & tx::AUTO_ROUTE, 0);
        assert_eq!(DEFAULT_TX_OPTIONS & tx::LOW_POWER, 0);
    }
}
