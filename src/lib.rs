//! Quill: a persona-driven short-post generator.
//!
//! Turns a topic into a post that fits a persona's voice and length bounds.
//! A text generator is asked for a draft; the draft is normalized,
//! decorated and validated, with bounded retries and a curated fallback.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;

pub mod analyzer;
pub mod normalizer;
pub mod persona;
pub mod prompt;
pub mod style;
pub mod validator;

pub mod controller;
pub mod generator;
pub mod publish;
