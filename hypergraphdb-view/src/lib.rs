#![allow(dead_code)]

// Views (component E): strategies for interpreting a vertex's edges under a
// codec, swappable per edge via a named view registry.

mod context;
mod registry;
mod restriction;
mod traversal;
mod views;

pub use context::ViewContext;
pub use registry::ViewFactory;
pub use traversal::{TraversalStep, View};
pub use views::{GraphView, StaticView};
