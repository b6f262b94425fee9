//! The vendor node-map seam.
//!
//! A node map exposes the camera's registers as named, typed nodes the way
//! GenICam/GenApi does. Everything the camera models in this crate do goes
//! through the [`NodeMap`] trait, so the same configuration code drives the
//! vendor SDK binding or the [`InMemoryNodeMap`] used for dry runs and tests.

mod memory;
mod property;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub use memory::{InMemoryNodeMap, NodeWrite};
pub use property::set_property;

/// Interface type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Boolean,
    Integer,
    Float,
    Enumeration,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Boolean => "boolean",
            NodeKind::Integer => "integer",
            NodeKind::Float => "float",
            NodeKind::Enumeration => "enumeration",
        };
        f.write_str(name)
    }
}

/// GenApi access mode of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessMode {
    NotAvailable,
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn is_available(self) -> bool {
        self != AccessMode::NotAvailable
    }

    pub fn is_readable(self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, AccessMode::WriteOnly | AccessMode::ReadWrite)
    }
}

/// What the node map reports about an implemented node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo {
    pub kind: NodeKind,
    pub access: AccessMode,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeMapError {
    #[error("Node '{0}' is not implemented")]
    NotFound(String),

    #[error("Node '{name}' is not a {expected} node")]
    TypeMismatch { name: String, expected: NodeKind },

    #[error("{message} (node '{name}')")]
    Vendor { name: String, message: String },
}

impl NodeMapError {
    pub fn vendor(name: impl Into<String>, message: impl Into<String>) -> Self {
        NodeMapError::Vendor {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A value that can be written to a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Enum(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Enum(v) => f.write_str(v),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Float(f64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Enum(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Enum(value)
    }
}

impl From<&String> for PropertyValue {
    fn from(value: &String) -> Self {
        PropertyValue::Enum(value.clone())
    }
}

/// Named, typed access to camera features.
///
/// Implementors translate vendor failures into [`NodeMapError::Vendor`],
/// keeping the vendor's message text.
pub trait NodeMap {
    /// Type and access mode of `name`, or `None` when the camera does not
    /// implement it.
    fn node(&self, name: &str) -> Option<NodeInfo>;

    fn is_available(&self, name: &str) -> bool {
        self.node(name).is_some_and(|info| info.access.is_available())
    }

    fn get_bool(&self, name: &str) -> Result<bool, NodeMapError>;
    fn get_int(&self, name: &str) -> Result<i64, NodeMapError>;
    fn get_float(&self, name: &str) -> Result<f64, NodeMapError>;
    fn get_enum(&self, name: &str) -> Result<String, NodeMapError>;

    fn int_range(&self, name: &str) -> Result<(i64, i64), NodeMapError>;
    fn float_range(&self, name: &str) -> Result<(f64, f64), NodeMapError>;

    /// Symbolic names of the entries currently available on an enumeration.
    fn enum_entries(&self, name: &str) -> Result<Vec<String>, NodeMapError>;

    fn set_bool(&mut self, name: &str, value: bool) -> Result<(), NodeMapError>;
    fn set_int(&mut self, name: &str, value: i64) -> Result<(), NodeMapError>;
    fn set_float(&mut self, name: &str, value: f64) -> Result<(), NodeMapError>;
    fn set_enum(&mut self, name: &str, entry: &str) -> Result<(), NodeMapError>;
}
