#![doc = include_str!("../README.md")]

pub mod error;
pub mod local;
mod process;
pub mod ssh;
pub mod topology;

pub use error::RemoteError;
pub use local::LocalHost;
pub use ssh::SshHost;
pub use topology::build_topology;
