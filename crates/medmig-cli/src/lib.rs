//! Library side of the `medmig` binary: configuration, logging and the
//! migration pipeline stages.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
