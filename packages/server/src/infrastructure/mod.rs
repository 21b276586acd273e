//! Infrastructure layer: concrete repositories and wire DTOs.

pub mod dto;
pub mod repository;
