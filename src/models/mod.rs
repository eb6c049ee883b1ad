//! Data models for the Student Opinion API.
//!
//! These models match the shape the frontend reads from `/api/articles`.

mod article;

pub use article::*;
