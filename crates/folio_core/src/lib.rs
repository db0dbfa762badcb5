//! Folio Core Runtime
//!
//! Foundational primitives shared by the page engine crates:
//!
//! - **Geometry**: points, sizes and rectangles in CSS pixels
//! - **Input Events**: scroll, wheel, pointer and resize events with timestamps
//! - **State Machines**: the `StateTransitions` trait for small per-element FSMs
//! - **Reactive Signals**: a single-threaded signal graph for derived UI state
//!
//! # Example
//!
//! ```rust
//! use folio_core::reactive::ReactiveGraph;
//!
//! let mut graph = ReactiveGraph::new();
//! let active = graph.create_signal(String::from("about"));
//!
//! graph.set(active, String::from("experience"));
//! assert_eq!(graph.get(active).as_deref(), Some("experience"));
//! ```

pub mod events;
pub mod fsm;
pub mod geometry;
pub mod reactive;

pub use events::{event_types, InputEvent, Millis};
pub use fsm::StateTransitions;
pub use geometry::{Point, Rect, Size};
pub use reactive::{Effect, EffectId, ReactiveGraph, Signal, SignalId};
