//! Cross-reference engine for multi-book fiction projects.
//!
//! Three operations over a series of manuscripts:
//!
//! - [`extract_candidates`] finds likely entity names in raw prose,
//! - [`detect`] / [`detect_full_project`] link catalogued entities to the
//!   chapters that mention them, recording appearances,
//! - [`cross_book_presence`] reports which books each entity appears in.

pub mod boundary;
pub mod candidate;
pub mod classifier;
pub mod config;
pub mod cues;
pub mod dedup;
pub mod detect;
pub mod error;
pub mod gazetteer;
pub mod noise;
pub mod presence;
pub mod scanner;
pub mod scoring;
pub mod store;

pub use story_types as types;

pub use candidate::extract_candidates;
pub use config::{ClassifierConfig, EngineConfig, ExtractionConfig};
pub use detect::{detect, detect_full_project};
pub use error::{Error, Result};
pub use presence::cross_book_presence;
pub use store::{JsonStore, Store};
