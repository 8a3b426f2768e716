// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

pub mod constant;
pub mod cv;
pub mod dist;
pub mod error;
pub mod im;
pub mod task;
pub mod ut;

pub use dist::{convex_hulls, convex_hulls_sequential};
pub use error::CohullError;
