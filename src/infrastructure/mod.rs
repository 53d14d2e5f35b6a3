//! Infrastructure layer for filesystem locations.
//!
//! Resolves where keygrid looks for its configuration file and where it writes
//! trace files. Nothing in the engine itself touches the filesystem.

pub mod paths;

pub use paths::{config_dir, data_dir, default_config_file, expand_tilde};
