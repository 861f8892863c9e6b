//! Command class dispatcher - routes frames and value writes to handlers

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use meshwave_shared::{ApplicationCommand, NodeId, PRIMARY_INSTANCE};
use tracing::{debug, warn};

use super::handlers::{CommandClassHandler, Disposition, HandlerContext};
use crate::event::EventBus;
use crate::transport::ControllerDriver;
use crate::value::NodeValue;

/// Routes inbound commands and local value writes by command class
pub struct CommandDispatcher {
    handlers: HashMap<u8, Arc<dyn CommandClassHandler>>,
    driver: Arc<dyn ControllerDriver>,
    events: EventBus,
}

impl CommandDispatcher {
    pub fn new(driver: Arc<dyn ControllerDriver>, events: EventBus) -> Self {
        Self {
            handlers: HashMap::new(),
            driver,
            events,
        }
    }

    /// Register a handler for its command class
    pub fn register(&mut self, handler: Arc<dyn CommandClassHandler>) {
        let previous = self.handlers.insert(handler.class_id(), handler);
        if let Some(previous) = previous {
            warn!(
                class = previous.class_name(),
                "Replacing an already registered command class handler"
            );
        }
    }

    fn context(&self, node_id: NodeId, instance: u8) -> HandlerContext {
        HandlerContext {
            node_id,
            instance,
            driver: self.driver.clone(),
            events: self.events.clone(),
        }
    }

    /// Route one inbound application command to its handler
    ///
    /// Malformed payloads are logged and dropped; the loop feeding this
    /// method keeps running whatever a single frame contained.
    pub fn dispatch(&self, command: &ApplicationCommand) -> Disposition {
        let Some(handler) = self.handlers.get(&command.command_class) else {
            debug!(
                node = command.node_id,
                class = command.command_class,
                "No handler for command class"
            );
            return Disposition::NotHandled;
        };

        let ctx = self.context(command.node_id, PRIMARY_INSTANCE);
        match handler.handle_frame(&ctx, &command.data) {
            Ok(disposition) => disposition,
            Err(e) => {
                warn!(
                    node = command.node_id,
                    class = handler.class_name(),
                    "Dropping malformed command: {}",
                    e
                );
                Disposition::NotHandled
            }
        }
    }

    /// Route a local value write to the handler for its command class
    pub fn set_value(
        &self,
        command_class: u8,
        node_id: NodeId,
        value: &NodeValue,
    ) -> Result<Disposition> {
        let Some(handler) = self.handlers.get(&command_class) else {
            return Ok(Disposition::NotHandled);
        };

        let ctx = self.context(node_id, value.instance);
        handler.set_value(&ctx, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handlers::SceneActivation;
    use crate::event::Event;
    use crate::value::Value;
    use bytes::Bytes;
    use meshwave_shared::{command_class, HomeId, OutboundFrame};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct NullDriver {
        submitted: Mutex<Vec<OutboundFrame>>,
    }

    impl ControllerDriver for NullDriver {
        fn home_id(&self) -> HomeId {
            7
        }

        fn transmit_options(&self) -> u8 {
            0x05
        }

        fn submit(&self, frame: OutboundFrame, _priority: crate::transport::SendPriority) -> Result<()> {
            self.submitted.lock().unwrap().push(frame);
            Ok(())
        }
    }

    fn dispatcher() -> (
        CommandDispatcher,
        Arc<NullDriver>,
        mpsc::UnboundedReceiver<Event>,
    ) {
        let driver = Arc::new(NullDriver {
            submitted: Mutex::new(Vec::new()),
        });
        let (events, rx) = EventBus::new();
        let mut dispatcher = CommandDispatcher::new(driver.clone(), events);
        dispatcher.register(Arc::new(SceneActivation));
        (dispatcher, driver, rx)
    }

    #[test]
    fn test_dispatch_routes_to_scene_handler() {
        let (dispatcher, _driver, mut rx) = dispatcher();

        let disposition = dispatcher.dispatch(&ApplicationCommand {
            node_id: 4,
            command_class: command_class::SCENE_ACTIVATION,
            data: Bytes::from_static(&[0x01, 2, 0]),
        });

        assert!(disposition.is_handled());
        assert!(matches!(
            rx.try_recv(),
            Ok(Event::SceneActivated { node_id: 4, scene_id: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_command_class_is_not_handled() {
        let (dispatcher, _driver, mut rx) = dispatcher();

        let disposition = dispatcher.dispatch(&ApplicationCommand {
            node_id: 4,
            command_class: 0x20,
            data: Bytes::from_static(&[0x01, 0xff]),
        });

        assert_eq!(disposition, Disposition::NotHandled);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_malformed_command_is_dropped_not_propagated() {
        let (dispatcher, _driver, mut rx) = dispatcher();

        let disposition = dispatcher.dispatch(&ApplicationCommand {
            node_id: 4,
            command_class: command_class::SCENE_ACTIVATION,
            data: Bytes::from_static(&[0x01]),
        });

        assert_eq!(disposition, Disposition::NotHandled);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_set_value_routes_by_class() {
        let (dispatcher, driver, _rx) = dispatcher();

        let disposition = dispatcher
            .set_value(
                command_class::SCENE_ACTIVATION,
                11,
                &NodeValue::new(Value::Byte(3)),
            )
            .expect("set failed");
        assert!(disposition.is_handled());
        assert_eq!(
            driver.submitted.lock().unwrap()[0].as_bytes(),
            &[11, 3, 0x2b, 0x01, 3, 0x05]
        );

        let disposition = dispatcher
            .set_value(0x20, 11, &NodeValue::new(Value::Byte(3)))
            .expect("set failed");
        assert_eq!(disposition, Disposition::NotHandled);

        // Endpoint index rides along untouched
        let disposition = dispatcher
            .set_value(
                command_class::SCENE_ACTIVATION,
                11,
                &NodeValue::with_instance(2, Value::Byte(8)),
            )
            .expect("set failed");
        assert!(disposition.is_handled());
    }
}
