//! Cy-Bot: retrieval-augmented answers over Kerala cyber-law texts and
//! uploaded documents.

pub mod adapters;
pub mod bot;
pub mod config;
pub mod domain;
pub mod error;
pub mod index;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;

pub use bot::{CyBot, CyBotParts};
pub use config::Config;
pub use domain::{DocumentId, IntentLabel, Passage, PassageSource};
pub use error::{CyBotError, Result};
