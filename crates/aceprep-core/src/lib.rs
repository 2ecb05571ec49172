//! aceprep-core: selection, scoring, templates and session state.
//!
//! This crate holds everything aceprep does locally: the subject catalogs,
//! the selection bookkeeping behind the custom test form, the bounded
//! template store, the negative-marking scorer, the view state machine that
//! ties the four tools together, and the typed requests and strict parsing
//! around the hosted model that does the actual generating.

pub mod catalog;
pub mod error;
pub mod generation;
pub mod model;
pub mod persist;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod sheet;
pub mod templates;
pub mod traits;
