//! Workflow services.
//!
//! # Responsibility
//! - Orchestrate formula and repository calls into use-case level APIs.
//! - Keep CLI layers decoupled from storage details.

pub mod converter_service;
