pub mod backend;
pub mod config;
pub mod dto;
pub mod error;
pub mod http;
pub mod models;
pub mod response;
pub mod services;
