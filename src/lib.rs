//! Handon - volunteering platform backend
//!
//! Volunteers log time against campaigns through a start/stop session
//! lifecycle and earn reward points for every whole hour they contribute.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
