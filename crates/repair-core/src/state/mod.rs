//! Order state management.
//!
//! Every change to a stored order goes through the state machine, which
//! serializes concurrent changes per order and validates status transitions.

pub mod order;

pub use order::{OrderStateError, OrderStateMachine};
