//! HTTP front end for the ProposalGen pipeline: one form, one button, one result.

pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod views;
