//! Command handlers. `provision` talks to the inventory; `config` never does.

pub mod config_cmd;
pub mod provision;
