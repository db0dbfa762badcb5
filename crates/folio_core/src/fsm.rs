//! Minimal state machine trait
//!
//! Implement this trait on a state enum to define how events cause
//! transitions.
//!
//! # Example
//!
//! ```
//! use folio_core::fsm::StateTransitions;
//! use folio_core::event_types::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
//! enum Header {
//!     #[default]
//!     Transparent,
//!     Blurred,
//! }
//!
//! impl StateTransitions for Header {
//!     fn on_event(&self, event: u32) -> Option<Self> {
//!         match (self, event) {
//!             (Header::Transparent, SCROLL) => Some(Header::Blurred),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! assert_eq!(Header::Transparent.on_event(SCROLL), Some(Header::Blurred));
//! assert_eq!(Header::Blurred.on_event(SCROLL), None);
//! ```

use std::hash::Hash;

/// A state that reacts to numeric events
pub trait StateTransitions: Clone + Copy + PartialEq + Eq + Hash + std::fmt::Debug + 'static {
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;

    /// Apply an event in place, returning true when the state changed
    fn apply(&mut self, event: u32) -> bool {
        match self.on_event(event) {
            Some(next) if next != *self => {
                *self = next;
                true
            }
            _ => false,
        }
    }
}
