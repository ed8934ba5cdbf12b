// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Profiling cancelled")]
    Cancelled,

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Dispatcher error: {0}")]
    Dispatch(String),

    #[error("Worker thread error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

/// A module whose type metadata could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("corrupt metadata in module '{module}': {reason}")]
    Corrupt { module: String, reason: String },

    #[error("type '{type_name}' in module '{module}' is not a generic definition")]
    NotGeneric { module: String, type_name: String },

    #[error("duplicate type '{type_name}' in module '{module}'")]
    DuplicateType { module: String, type_name: String },
}

/// Failure to compile a single member into a profile, or to bind a profile
/// to a target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("member '{member}' on '{type_name}' has no accessor binding")]
    MissingBinding { type_name: String, member: String },

    #[error("member '{member}' on '{type_name}' is malformed: {reason}")]
    Malformed {
        type_name: String,
        member: String,
        reason: String,
    },

    #[error("method '{member}' rejected arguments {args}")]
    ArgumentMismatch { member: String, args: String },

    #[error("target is not an instance of '{expected}'")]
    TargetMismatch { expected: String },

    #[error("instance profile '{0}' requires a target")]
    MissingTarget(String),

    #[error("static profile '{0}' does not take a target")]
    UnexpectedTarget(String),

    #[error("profile '{0}' is read-only")]
    ReadOnly(String),

    #[error("value for '{member}' has the wrong type, expected '{expected}'")]
    ValueType { member: String, expected: String },

    #[error("{0}")]
    Construction(String),
}
