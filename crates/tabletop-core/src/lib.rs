// tabletop-core: Types, spaces, config, and errors for tabletop manipulation environments.

pub mod config;
pub mod error;
pub mod spaces;
pub mod types;
