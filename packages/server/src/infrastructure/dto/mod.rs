//! Data Transfer Objects (DTOs) for the HTTP API.

pub mod http;
