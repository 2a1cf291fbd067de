//! Command handlers

pub mod config;
pub mod doc;
pub mod index;
pub mod push;
