//! Core use-case services.
//!
//! # Responsibility
//! - Validate structural input above the repository layer.
//! - Keep the operation boundary decoupled from storage details.

pub mod section_service;
