//! Command class handlers

mod scene_activation;

pub use scene_activation::SceneActivation;

use std::sync::Arc;

use meshwave_shared::{CodecError, NodeId};

use crate::event::EventBus;
use crate::transport::ControllerDriver;
use crate::value::NodeValue;

/// Outcome of offering a frame or a value write to a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The handler consumed the input
    Handled,
    /// Not this handler's business; the caller decides what that means
    NotHandled,
}

impl Disposition {
    pub fn is_handled(self) -> bool {
        matches!(self, Disposition::Handled)
    }
}

/// Context passed to command class handlers, built per call
///
/// Node identity and endpoint index arrive here rather than through any
/// ambient driver state.
#[derive(Clone)]
pub struct HandlerContext {
    /// Node the inbound frame came from, or the target of a value write
    pub node_id: NodeId,
    /// Endpoint index on that node
    pub instance: u8,
    /// Driver used for identifiers, transmit options and submission
    pub driver: Arc<dyn ControllerDriver>,
    /// Bus that domain events are published to
    pub events: EventBus,
}

/// A handler for one command class
///
/// Both operations are synchronous, non-blocking and stateless; every
/// failure is a returned value, never a panic, since the dispatch loop
/// must keep processing other frames regardless of one handler's
/// outcome.
pub trait CommandClassHandler: Send + Sync {
    /// Command class id this handler answers for
    fn class_id(&self) -> u8;

    /// Wire name of the command class
    fn class_name(&self) -> &'static str;

    /// Decode one inbound command-class payload
    ///
    /// Returns `NotHandled` for sub-commands this class does not
    /// understand, and a `CodecError` for payloads too short to read.
    fn handle_frame(&self, ctx: &HandlerContext, data: &[u8]) -> Result<Disposition, CodecError>;

    /// Encode a local value write into an outbound command
    ///
    /// Returns `NotHandled` when the value's declared type does not fit
    /// this command class.
    fn set_value(&self, ctx: &HandlerContext, value: &NodeValue) -> anyhow::Result<Disposition>;
}
