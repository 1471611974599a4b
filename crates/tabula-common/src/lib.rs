//! Common utilities for the Tabula table renderer.
//!
//! This crate provides shared infrastructure used by the layout engine and
//! the rendering backends:
//! - **Images** - decoded RGBA pixel buffers with their natural bounds
//! - **Fetching** - blocking byte fetches from HTTP(S), `data:` URLs, and files
//! - **Warning System** - deduplicated warnings routed through `log`

pub mod image;
pub mod net;
pub mod warning;
