//! Airpath - A health-aware trip planner that scores routes by air-quality
//! exposure.
//!
//! # Overview
//!
//! Airpath samples air quality along candidate routes and turns the samples
//! into a ranked comparison: a 0-100 breathability score per route, a
//! personalized health impact for the rider's profile, positional alerts
//! for pollution zones along the way, and departure-time advice.
//!
//! # Modules
//!
//! - [`model`]: Data types for samples, profiles, scores, alerts, and routes
//! - [`scoring`]: AQI classification and breathability scoring
//! - [`health`]: Personalized health-impact assessment
//! - [`alerts`]: Positional alert generation
//! - [`timing`]: Time-of-day departure recommendations
//! - [`fallback`]: Deterministic synthetic readings for provider outages
//! - [`data_sources`]: Air-quality providers and the maps collaborator
//! - [`analysis`]: The route analyzer and comparison engine
//! - [`api`]: HTTP API handlers

pub mod alerts;
pub mod analysis;
pub mod api;
pub mod data_sources;
pub mod fallback;
pub mod health;
pub mod model;
pub mod scoring;
pub mod timing;
