//! Player port definitions.
//!
//! The store talks to the outside world only through these traits; the UI
//! shell and the transport provide the implementations.

pub mod outbound;
