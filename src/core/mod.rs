pub mod config;
pub mod market;
pub mod pipeline;
pub mod relay;
pub mod terminal;
