//! Creation Tree - file tree engine for multi-file playground creations
//!
//! - `tree`: the nested file/folder model, path resolution and mutations
//! - `creation`: creations, UI intents and the manager for open creations
//! - `storage`: Sled persistence for saved creations
//! - `api`: Axum HTTP surface
//! - `config`: environment-driven server configuration

pub mod api;
pub mod config;
pub mod creation;
pub mod storage;
pub mod tree;
