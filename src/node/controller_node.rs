use crate::core::Symbol;
use crate::machine::Controller;
use crate::node::error::NodeError;
use crate::node::queue::{Delivery, DeliveryQueue};
use log::{debug, warn};
use std::sync::Arc;

/// A controller behind a text observation topic.
///
/// Each observation is one symbol written as text. The answer goes to the
/// shared [`DeliveryQueue`], from which a separate publisher takes it.
pub struct ControllerNode {
    controller: Controller,
    queue: Arc<DeliveryQueue>,
    tick_index: u64,
}

impl ControllerNode {
    pub fn new(controller: Controller, queue: Arc<DeliveryQueue>) -> Self {
        Self {
            controller,
            queue,
            tick_index: 0,
        }
    }

    /// Handle one observation message.
    ///
    /// The tick index advances for every message, answered or not, so
    /// published tick indices show gaps where observations failed.
    pub fn on_observation(&mut self, text: &str) -> Result<Delivery, NodeError> {
        let tick_index = self.tick_index;
        self.tick_index += 1;

        let input_symbol: Symbol = text
            .trim()
            .parse()
            .map_err(|_| NodeError::MalformedObservation(text.to_string()))?;

        let outputs = self
            .controller
            .get_control_actions(input_symbol)
            .map_err(|e| {
                warn!("tick {}: no control action for x_{}: {}", tick_index, input_symbol, e);
                e
            })?;

        let delivery = Delivery {
            tick_index,
            input_symbol,
            outputs,
        };
        debug!("tick {}: queued {}", tick_index, delivery);
        self.queue.push(delivery.clone())?;
        Ok(delivery)
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn queue(&self) -> &Arc<DeliveryQueue> {
        &self.queue
    }

    /// Index the next observation will get.
    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }
}
