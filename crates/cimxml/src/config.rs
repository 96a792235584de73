// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Protocol constants and codec configuration.
//!
//! - **Static**: CIM-XML wire tokens and environment variable names
//! - **Runtime**: [`CodecConfig`], controlling how strictly the reader
//!   treats incoming CIM-XML, optionally overlaid from the environment
//!
//! # Environment
//!
//! - `CIMXML_STRICT_ATTRIBUTES`: reject unknown attributes (default: true)
//! - `CIMXML_ALLOW_EMPTY_NAMESPACE`: accept `LOCALNAMESPACEPATH` without
//!   `NAMESPACE` children (default: true)
//!
//! Accepted spellings are `1`/`true`/`yes` and `0`/`false`/`no`, any case.

use std::env;

/// Wire token for boolean true in `VALUE`/`KEYVALUE` content.
pub const BOOLEAN_TRUE: &str = "TRUE";

/// Wire token for boolean false in `VALUE`/`KEYVALUE` content.
pub const BOOLEAN_FALSE: &str = "FALSE";

pub const ENV_STRICT_ATTRIBUTES: &str = "CIMXML_STRICT_ATTRIBUTES";
pub const ENV_ALLOW_EMPTY_NAMESPACE: &str = "CIMXML_ALLOW_EMPTY_NAMESPACE";

/// Wire token for a boolean.
pub const fn boolean_token(b: bool) -> &'static str {
    if b {
        BOOLEAN_TRUE
    } else {
        BOOLEAN_FALSE
    }
}

/// Reader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Reject attributes the element contract does not name.
    pub strict_attributes: bool,
    /// Decode `<LOCALNAMESPACEPATH/>` to the empty namespace instead of
    /// failing.
    pub allow_empty_namespace: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            strict_attributes: true,
            allow_empty_namespace: true,
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient reader: unknown attributes are ignored.
    pub fn lenient() -> Self {
        Self {
            strict_attributes: false,
            ..Self::default()
        }
    }

    pub fn with_strict_attributes(mut self, strict: bool) -> Self {
        self.strict_attributes = strict;
        self
    }

    pub fn with_allow_empty_namespace(mut self, allow: bool) -> Self {
        self.allow_empty_namespace = allow;
        self
    }

    /// Defaults overlaid with the `CIMXML_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().apply_env_with(|name| env::var(name).ok())
    }

    /// Overlay settings from a variable lookup; unparsable values are
    /// ignored with a warning.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_STRICT_ATTRIBUTES).and_then(|v| parse_flag(ENV_STRICT_ATTRIBUTES, &v)) {
            self.strict_attributes = v;
        }
        if let Some(v) =
            lookup(ENV_ALLOW_EMPTY_NAMESPACE).and_then(|v| parse_flag(ENV_ALLOW_EMPTY_NAMESPACE, &v))
        {
            self.allow_empty_namespace = v;
        }
        self
    }
}

fn parse_flag(name: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        other => {
            log::warn!("[config] ignoring {}={:?}: expected a boolean", name, other);
            None
        }
    }
}
