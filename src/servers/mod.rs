//! Delivery layers for the core tracker. Only HTTP is implemented.
pub mod http;
