// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CIM-XML object model and codec
//!
//! Typed in-memory values for the CIM management-object protocol (classes,
//! instances, properties, qualifiers and object paths) with a lossless
//! CIM-XML encoding:
//! - [`encode`] turns any [`CimObject`] into a CIM-XML [`Element`]
//! - [`decode`] turns raw `VALUE` text into a typed value given its type tag
//! - [`parse_object`] reads encoded CIM-XML back into model values
//!
//! Transport, authentication and retries belong to the caller.
//!
//! # Quick Start
//!
//! ```
//! use cimxml::{encode, CimObject, Instance, InstanceName, Scalar};
//!
//! let mut disk = Instance::new("CIM_DiskDrive");
//! disk.set("DeviceID", "disk0")?;
//! disk.set("BlockSize", Scalar::Uint64(512))?;
//! let xml = encode(&CimObject::Instance(disk))?.to_string();
//! assert!(xml.starts_with(r#"<INSTANCE CLASSNAME="CIM_DiskDrive">"#));
//!
//! let name = InstanceName::with_keybindings("CIM_DiskDrive", [("DeviceID", "disk0")]);
//! assert_eq!(name.to_string(), r#"CIM_DiskDrive.DeviceID="disk0""#);
//! # Ok::<(), cimxml::CimError>(())
//! ```
//!
//! # Element Map
//!
//! | Value | Element |
//! |-------|---------|
//! | [`ClassName`] | `CLASSNAME` |
//! | [`InstanceName`] | `INSTANCENAME` |
//! | [`Property`] | `PROPERTY` / `PROPERTY.ARRAY` |
//! | [`PropertyReference`] | `PROPERTY.REFERENCE` |
//! | [`Instance`] | `INSTANCE` |
//! | [`NamedInstance`] | `VALUE.NAMEDINSTANCE` |
//! | [`Class`] | `CLASS` |
//! | [`Method`] | `METHOD` |

pub mod class;
pub mod codec;
pub mod config;
pub mod error;
pub mod instance;
pub mod parse;
pub mod path;
pub mod property;
pub mod qualifier;
pub mod types;
pub mod xml;

pub use class::{Class, ClassBuilder, Method, MethodBuilder, Parameter};
pub use codec::{decode, encode, encode_to_string, CimObject, Decoded, RawValue, ToXml};
pub use config::CodecConfig;
pub use error::{CimError, Result};
pub use instance::{Instance, InstanceBuilder, NamedInstance};
pub use parse::{parse_class, parse_instance, parse_named_instance, parse_object, parse_path};
pub use path::{
    ClassName, ClassPath, InstanceName, InstancePath, KeyValue, LocalClassPath,
    LocalInstancePath, LocalNamespacePath, NamespacePath, ObjectPath,
};
pub use property::{Property, PropertyBuilder, PropertyEntry, PropertyReference, PropertyValue};
pub use qualifier::{Qualifier, QualifierBuilder};
pub use types::{CimDateTime, CimType, Scalar, Value};
pub use xml::Element;
