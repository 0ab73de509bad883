// Frameworks layer: configuration and application wiring.

pub mod config;
pub mod console;
