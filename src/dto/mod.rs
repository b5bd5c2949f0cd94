//! Wire-facing request, response, and event types.

pub mod events;
pub mod game;
pub mod health;
pub mod validation;
pub mod ws;
