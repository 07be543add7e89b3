//! Straylight — a block-based email composition engine.
//!
//! Selects reusable text blocks by audience and tone, substitutes
//! personalization variables, and assembles subject/body pairs, with batch
//! processing and per-contact failure isolation. Delivery, OAuth, and the
//! marketing-platform API surface live outside this crate; its output is a
//! [`compose::ComposedEmail`] handed to whatever sends it.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod blocks;
pub mod compose;
pub mod config;
pub mod logging;
