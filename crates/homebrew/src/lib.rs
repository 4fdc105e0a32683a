//! Homebrew formula updater for bearsays.
//!
//! This crate regenerates `Formula/bearsays.rb` for a released version:
//! it downloads the published archive for every supported target, checks
//! that each one looks like a real build, computes its SHA-256 and renders
//! the formula template.
//!
//! # Example
//!
//! ```rust,ignore
//! use bearsays_homebrew::{FormulaUpdater, UpdaterConfig};
//! use bearsays_release::{ApiToken, Version};
//!
//! let config = UpdaterConfig::new(
//!     "https://code.bearcove.cloud",
//!     "bearcove",
//!     "bearsays",
//!     ApiToken::new(token),
//! );
//!
//! let path = FormulaUpdater::new(config).update(&Version::new(2, 2, 0)).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

mod formula;
mod updater;

pub use formula::{BinaryInfo, DEFAULT_TEMPLATE, FormulaData, FormulaTemplate, class_name};
pub use updater::{FormulaUpdater, MIN_ARTIFACT_SIZE, UpdaterConfig};
