//! BinGo - Joern toolchain support for binary vulnerability analysis
//!
//! Locates and validates a Joern installation, resolves the layered BinGo
//! configuration, sizes the Joern JVM heap and reads the JSON artifacts the
//! analysis stages exchange.

pub mod artifacts;
pub mod config;
pub mod env_vars;
pub mod host;
pub mod joern;
pub mod logging;
pub mod skills;
