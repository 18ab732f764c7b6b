pub mod cache;
pub mod client;
pub mod config;
pub mod mcp;
pub mod shaper;
pub mod workspace;

#[cfg(test)]
mod testing;
