//! Lifecycle reconciler for sequencing sample-processing runs.
//!
//! Tracks runs through three stages — discovered, workflow-triggered,
//! downloaded — using two flat persisted lists as the source of truth, and
//! gates the download transition on the aggregated status of sub-jobs
//! reported by an external execution service.
//!
//! # Components
//!
//! - [`classify`]: validates run directory names
//! - [`registry`]: persists and reconciles the run / downloaded lists
//! - [`status`]: aggregates sub-job states into a go/no-go decision
//! - [`controller`]: drives the trigger and download passes
//!
//! The process is a single short-lived pass, meant to be re-invoked by an
//! external timer; it provides no retries, backoff, or alerting beyond the
//! log stream.

pub mod classify;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod manifest;
pub mod registry;
pub mod service;
pub mod status;
