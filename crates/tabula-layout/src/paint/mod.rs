//! Painting: turn a laid-out table into drawing commands.
//!
//! ```text
//! Table ──compose──▶ Composition { size, DisplayList } ──backend──▶ pixels
//! ```

pub mod composer;
pub mod display_list;

pub use composer::{Composition, compose};
pub use display_list::{DisplayCommand, DisplayList};
