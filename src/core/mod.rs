//! Core primitives: properties, results, operations and handlers.

pub mod handler;
pub mod operation;
pub mod property;
pub mod result;

pub use handler::{Handler, HandlerState, InvalidHandler, ValidHandler};
pub use operation::{Operation, OperationError, Operations};
pub use property::{Properties, Property, PropertyError, PropertyKind, PropertySource, PropertyValue};
pub use result::{OpResult, Outcome, ResultProducer};
