//! Rigging - pluggable capability composition for container projects
//!
//! This crate assembles an API out of handlers. Each handler owns a set of
//! named operations; builders construct, validate and register handlers in
//! a requested order, and handlers reach each other's capabilities only
//! through typed wrappers.

pub mod api;
pub mod backend;
pub mod builder;
pub mod core;
pub mod handlers;
pub mod util;
pub mod wrapper;

pub use api::{Api, OperationRegistry};
pub use builder::{
    ActivationReport, Builder, BuilderSettings, Implementations, LocalBuilder, SettingsProvider,
};
pub use core::{Handler, OpResult, Operation, Operations, Properties, Property, PropertyValue};
pub use util::context::GlobalContext;
