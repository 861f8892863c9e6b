//! Command class dispatch for the controller node
//!
//! This module handles:
//! - Routing inbound application commands to their command class handler
//! - Routing local value writes to the handler that encodes them
//! - Turning handler outcomes into logs without ever unwinding

mod dispatcher;
pub mod handlers;

pub use dispatcher::CommandDispatcher;
