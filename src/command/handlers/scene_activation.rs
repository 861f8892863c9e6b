//! Scene Activation command class handler
//!
//! Decodes Scene Activation Set commands from remote nodes into scene
//! events, and encodes local scene value writes into outbound Set
//! commands for the driver to deliver.

use meshwave_shared::{command_class, CodecError, OutboundFrame, SceneDuration};
use tracing::{debug, info};

use super::{CommandClassHandler, Disposition, HandlerContext};
use crate::event::Event;
use crate::transport::SendPriority;
use crate::value::{NodeValue, Value};

/// Scene Activation sub-commands
const SCENE_ACTIVATION_SET: u8 = 0x01;

/// A Set payload carries opcode, scene id and duration code
const SET_PAYLOAD_LEN: usize = 3;

pub struct SceneActivation;

impl CommandClassHandler for SceneActivation {
    fn class_id(&self) -> u8 {
        command_class::SCENE_ACTIVATION
    }

    fn class_name(&self) -> &'static str {
        "SCENE_ACTIVATION"
    }

    fn handle_frame(&self, ctx: &HandlerContext, data: &[u8]) -> Result<Disposition, CodecError> {
        let Some(&opcode) = data.first() else {
            return Err(CodecError::Truncated {
                needed: 1,
                available: 0,
            });
        };

        // Only the Set sub-command exists in this class
        if opcode != SCENE_ACTIVATION_SET {
            return Ok(Disposition::NotHandled);
        }

        if data.len() < SET_PAYLOAD_LEN {
            return Err(CodecError::Truncated {
                needed: SET_PAYLOAD_LEN,
                available: data.len(),
            });
        }

        let scene_id = data[1];
        let delay = SceneDuration::from_code(data[2]);

        info!(
            node = ctx.node_id,
            instance = ctx.instance,
            scene = scene_id,
            delay = %delay,
            "Received scene activation set, raising scene event"
        );

        ctx.events.publish(Event::SceneActivated {
            home_id: ctx.driver.home_id(),
            node_id: ctx.node_id,
            scene_id,
        });

        Ok(Disposition::Handled)
    }

    fn set_value(&self, ctx: &HandlerContext, value: &NodeValue) -> anyhow::Result<Disposition> {
        // Scene ids are byte values; anything else is a wiring bug upstream
        let &Value::Byte(scene_id) = &value.value else {
            debug!(
                node = ctx.node_id,
                kind = ?value.value.kind(),
                "Refusing to encode a non-byte value as a scene id"
            );
            return Ok(Disposition::NotHandled);
        };

        info!(
            node = ctx.node_id,
            instance = ctx.instance,
            scene = scene_id,
            "Setting node to scene"
        );

        let frame = OutboundFrame::command(
            ctx.node_id,
            self.class_id(),
            SCENE_ACTIVATION_SET,
            &[scene_id],
            ctx.driver.transmit_options(),
        );
        ctx.driver.submit(frame, SendPriority::Normal)?;

        Ok(Disposition::Handled)
    }
}
