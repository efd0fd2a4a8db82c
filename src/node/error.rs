use crate::machine::MachineError;
use crate::node::queue::Delivery;
use thiserror::Error;

/// Errors at the messaging boundary.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("observation '{0}' is not a symbol")]
    MalformedObservation(String),

    /// Carries the refused delivery back to the caller.
    #[error("delivery queue is full ({capacity} pending); rejected {delivery}")]
    QueueFull { capacity: usize, delivery: Delivery },

    #[error(transparent)]
    Controller(#[from] MachineError),
}
