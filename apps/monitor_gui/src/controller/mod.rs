//! Controller layer: UI events, session state transitions, and command
//! orchestration.

pub mod events;
pub mod orchestration;
pub mod session;
