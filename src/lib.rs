//! # NutriLog: food log analysis pipeline
//!
//! Normalizes nutrition records from a local food log and the OpenFoodFacts
//! database, encodes them as compact NLOG text, assembles a prompt around
//! it and hands the prompt to a text-generation backend.
//!
//! ## Architecture
//!
//! - **[`records`]**: Canonical `NutritionRecord`, raw upstream shapes, normalization
//! - **[`nlog`]**: Deterministic pipe-delimited NLOG encoder
//! - **[`prompt`]**: System prompt template and size metrics
//! - **[`pipeline`]**: Encode → assemble → generate orchestration with stage events
//! - **[`generation`]**: Generation backend trait, OpenAI-compatible client, mock, retry
//! - **[`food_db`]**: Food database trait and OpenFoodFacts client
//! - **[`config`]**: Configuration loading and validation
//! - **[`sample`]**: Built-in demo food log and profile
//! - **[`console`]**: Terminal rendering of stage events and reports

pub mod config;
pub mod console;
pub mod food_db;
pub mod generation;
pub mod nlog;
pub mod pipeline;
pub mod prompt;
pub mod records;
pub mod sample;
