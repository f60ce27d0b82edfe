//! Console commands.
pub mod publish;
