//! Medication catalog, personal regimen, user profile and dosage reminders,
//! persisted to flat files.

mod atomic;
pub mod catalog;
pub mod error;
pub mod models;
pub mod profile;
pub mod regimen;
pub mod reminder;
pub mod service;
mod sheet;

pub use error::{MedError, Result};
