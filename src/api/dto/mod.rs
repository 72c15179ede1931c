//! Data Transfer Objects for REST request/response serialization.
//!
//! Dates travel as RFC 3339 strings; request bodies also accept plain
//! `YYYY-MM-DD` dates.

pub mod animal_dto;
pub mod common_dto;
pub mod observation_dto;
pub mod stats_dto;

pub use animal_dto::*;
pub use common_dto::*;
pub use observation_dto::*;
pub use stats_dto::*;
