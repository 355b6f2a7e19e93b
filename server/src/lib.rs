//! HTTP calendar service keeping per-user events in process memory.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod storage;
pub mod utils;
