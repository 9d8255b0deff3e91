pub mod apply;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod template;
pub mod theme;
