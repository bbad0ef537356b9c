//! Dengue Assistant - conversational support for dengue patients
//!
//! Each message is routed to one of three strategies: retrieval-augmented
//! medical answers, general conversation, or a guided registration form
//! that collects name and age and stores completed records.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
