#![doc = include_str!("../README.md")]

pub mod ad;
pub mod catalog;
pub mod error;
pub mod ipa;
pub mod lab;
pub mod nss_idmap;
pub mod scenarios;
pub mod sssd;

pub use catalog::{catalog, select};
pub use error::AdTrustError;
