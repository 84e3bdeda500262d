//! Scholarship review workflows: merit-list ranking, generation, and the HTTP
//! surface that exposes them.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
