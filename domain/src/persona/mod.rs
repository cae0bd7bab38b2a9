//! Persona definitions and roster resolution.

pub mod catalog;
