// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the object model, the encoder and the reader.

use thiserror::Error;

/// Codec and model errors.
///
/// Every error is raised at the call that detects it; nothing in this crate
/// retries or recovers silently.
#[derive(Debug, Error)]
pub enum CimError {
    /// A required field combination is invalid (e.g. a property with
    /// neither a type nor a value).
    #[error("Construction error: {0}")]
    Construction(String),

    /// A value is of a kind the codec cannot represent.
    #[error("Type error: {0}")]
    Type(String),

    /// Text cannot be decoded into the requested type.
    #[error("Value error: {0}")]
    Value(String),

    /// A keybinding value cannot be encoded.
    #[error("Encoding error for keybinding {key:?}: {reason}")]
    Encoding { key: String, reason: String },

    /// CIM-XML is well formed but violates the element contract.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The input is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl CimError {
    pub(crate) fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    pub(crate) fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }

    pub(crate) fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CimError>;
