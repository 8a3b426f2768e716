// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CohullError {
    BufferSizeError,
    DimensionError,
    GroupError(String),
    PartitionError(String),
    TaskOrderError(&'static str),
    OutputSizeError,
    LabelOverflowError,
    ImageReadError,
    ImageWriteError,
    ImageExtensionError,
    HullsReadError,
    HullsWriteError,
    DirError(String),
}

impl fmt::Display for CohullError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CohullError::BufferSizeError => {
                write!(
                    f,
                    "[cohull::BufferSizeError] The pixel buffer does not match the provided width and height."
                )
            }
            CohullError::DimensionError => {
                write!(
                    f,
                    "[cohull::DimensionError] Width and height must both be non-negative."
                )
            }
            CohullError::GroupError(message) => {
                write!(f, "[cohull::GroupError] Worker group failure. {}.", message)
            }
            CohullError::PartitionError(message) => {
                write!(
                    f,
                    "[cohull::PartitionError] Invalid partition of components. {}.",
                    message
                )
            }
            CohullError::TaskOrderError(message) => {
                write!(
                    f,
                    "[cohull::TaskOrderError] Task stage called out of order. {}",
                    message
                )
            }
            CohullError::OutputSizeError => {
                write!(
                    f,
                    "[cohull::OutputSizeError] Output buffers are too few or too small for the computed hulls."
                )
            }
            CohullError::LabelOverflowError => {
                write!(
                    f,
                    "[cohull::LabelOverflowError] Too many components to encode as a 16-bit label map."
                )
            }
            CohullError::ImageReadError => {
                write!(f, "[cohull::ImageReadError] Failed to read mask.")
            }
            CohullError::ImageWriteError => {
                write!(f, "[cohull::ImageWriteError] Failed to write image.")
            }
            CohullError::ImageExtensionError => {
                write!(
                    f,
                    "[cohull::ImageExtensionError] Could not detect a valid image extension for input."
                )
            }
            CohullError::HullsReadError => {
                write!(f, "[cohull::HullsReadError] Hulls could not be read.")
            }
            CohullError::HullsWriteError => {
                write!(
                    f,
                    "[cohull::HullsWriteError] Failed to successfully write hulls to output."
                )
            }
            CohullError::DirError(message) => {
                write!(
                    f,
                    "[cohull::DirError] Directory could not be read. {}.",
                    message
                )
            }
        }
    }
}

impl std::error::Error for CohullError {}
