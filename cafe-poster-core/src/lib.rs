#![doc = "cafe-poster-core: core pipeline library for cafe-poster."]

//! This crate contains the batch publishing pipeline: account token rotation,
//! per-item article publishing with failure isolation, pacing between items and
//! accounts, and the aggregated run report.
//! Transport clients (HTTP) are not included here; they implement the traits in [`contract`].
//!
//! # Usage
//! Build a [`config::PublishConfig`], wire the collaborators into
//! [`contract::Collaborators`] and call [`orchestrate::Orchestrator::run`].

pub mod classify;
pub mod config;
pub mod contract;
pub mod error;
pub mod group;
pub mod message;
pub mod orchestrate;
pub mod pacing;
pub mod publish;
pub mod report;
pub mod session;
