//! Bill Service - invoice record keeping with numbering and CSV/JSON export.

pub mod admin;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
