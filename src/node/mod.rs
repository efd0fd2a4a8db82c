//! Messaging boundary for running a controller as a service.
//!
//! Observations arrive as text on one side; answers are queued for a
//! publisher on the other. The queue is bounded and its back-pressure
//! policy is chosen at construction.

mod controller_node;
pub mod error;
mod queue;

pub use controller_node::ControllerNode;
pub use error::NodeError;
pub use queue::{BackPressure, Delivery, DeliveryQueue};
