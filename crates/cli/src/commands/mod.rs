//! CLI Commands

pub mod demo;
pub mod policy;

pub use demo::DemoCommand;
pub use policy::PolicyCommand;
