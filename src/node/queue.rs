//! Bounded hand-off between the observation callback and the publisher.

use crate::core::Symbol;
use crate::node::error::NodeError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// One controller answer, ready to publish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub tick_index: u64,
    pub input_symbol: Symbol,
    pub outputs: Vec<Symbol>,
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, [", self.tick_index, self.input_symbol)?;
        for (i, out) in self.outputs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", out)?;
        }
        f.write_str("]]")
    }
}

/// What to do when a delivery arrives at a full queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackPressure {
    /// Refuse the new delivery with [`NodeError::QueueFull`].
    RejectNew,
    /// Evict the oldest pending delivery to make room.
    DropOldest,
}

#[derive(Debug, Default)]
struct Pending {
    items: VecDeque<Delivery>,
    dropped: u64,
}

/// Bounded FIFO of deliveries, shareable across threads via `Arc`.
///
/// # Example
///
/// ```rust
/// use symloop::node::{BackPressure, Delivery, DeliveryQueue};
///
/// let queue = DeliveryQueue::new(1, BackPressure::DropOldest);
/// queue.push(Delivery { tick_index: 0, input_symbol: 4, outputs: vec![40] }).unwrap();
/// queue.push(Delivery { tick_index: 1, input_symbol: 5, outputs: vec![50] }).unwrap();
///
/// assert_eq!(queue.dropped(), 1);
/// assert_eq!(queue.pop().unwrap().to_string(), "[1, 5, [50]]");
/// ```
#[derive(Debug)]
pub struct DeliveryQueue {
    pending: Mutex<Pending>,
    capacity: usize,
    policy: BackPressure,
}

impl DeliveryQueue {
    /// A queue holding at most `capacity` deliveries (at least one).
    pub fn new(capacity: usize, policy: BackPressure) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending: Mutex::new(Pending {
                items: VecDeque::with_capacity(capacity),
                dropped: 0,
            }),
            capacity,
            policy,
        }
    }

    pub fn push(&self, delivery: Delivery) -> Result<(), NodeError> {
        let mut pending = self.pending.lock();
        if pending.items.len() >= self.capacity {
            match self.policy {
                BackPressure::RejectNew => {
                    return Err(NodeError::QueueFull {
                        capacity: self.capacity,
                        delivery,
                    })
                }
                BackPressure::DropOldest => {
                    pending.items.pop_front();
                    pending.dropped += 1;
                }
            }
        }
        pending.items.push_back(delivery);
        Ok(())
    }

    /// Oldest pending delivery.
    pub fn pop(&self) -> Option<Delivery> {
        self.pending.lock().items.pop_front()
    }

    /// Take everything pending, oldest first.
    pub fn drain(&self) -> Vec<Delivery> {
        self.pending.lock().items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> BackPressure {
        self.policy
    }

    /// Deliveries evicted under [`BackPressure::DropOldest`].
    pub fn dropped(&self) -> u64 {
        self.pending.lock().dropped
    }
}
