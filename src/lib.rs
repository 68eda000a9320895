//! Variant effect annotation library.
//!
//! Classifies the effect of small variants and copy number changes on transcripts, given a
//! reference genome and a table of gene models.

pub mod annotate;
pub mod common;
pub mod error;
pub mod models;
