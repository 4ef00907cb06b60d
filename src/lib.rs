//! projsync: replicate a project hierarchy from a source site to a target site.
//!
//! Layers, innermost first:
//! - `domain`: records, nodes and the hierarchy builder (pure)
//! - `application`: replication, snapshot and sync services over I/O traits
//! - `infrastructure`: filesystem, REST client and service wiring
//! - `cli`: argument parsing, dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
