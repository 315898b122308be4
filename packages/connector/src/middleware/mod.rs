//! Request guards applied in front of handlers.

pub mod api_key;
