//! Engine properties
//!
//! Properties are named values living in one of three scopes. The engine
//! reports changes through Property messages; an empty name means every
//! property of that scope and source was removed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope a property belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyScope {
    Core,
    Stream,
    Module,
}

impl PropertyScope {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(PropertyScope::Core),
            1 => Some(PropertyScope::Stream),
            2 => Some(PropertyScope::Module),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            PropertyScope::Core => 0,
            PropertyScope::Stream => 1,
            PropertyScope::Module => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PropertyScope::Core => "core",
            PropertyScope::Stream => "stream",
            PropertyScope::Module => "module",
        }
    }

    /// Parse a lower-case scope name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "core" => Some(PropertyScope::Core),
            "stream" => Some(PropertyScope::Stream),
            "module" => Some(PropertyScope::Module),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire type tag of a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyValueType {
    Integer,
    Float,
    String,
    Boolean,
}

impl PropertyValueType {
    /// Value type tag meaning "no value"
    pub const NONE: i32 = -1;

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(PropertyValueType::Integer),
            1 => Some(PropertyValueType::Float),
            2 => Some(PropertyValueType::String),
            3 => Some(PropertyValueType::Boolean),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            PropertyValueType::Integer => 0,
            PropertyValueType::Float => 1,
            PropertyValueType::String => 2,
            PropertyValueType::Boolean => 3,
        }
    }
}

/// Property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Integer(i32),
    Float(f32),
    String(String),
    Boolean(bool),
}

impl PropertyValue {
    pub fn value_type(&self) -> PropertyValueType {
        match self {
            PropertyValue::Integer(_) => PropertyValueType::Integer,
            PropertyValue::Float(_) => PropertyValueType::Float,
            PropertyValue::String(_) => PropertyValueType::String,
            PropertyValue::Boolean(_) => PropertyValueType::Boolean,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            PropertyValue::Integer(v) => Some(*v),
            PropertyValue::Boolean(v) => Some(*v as i32),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Integer(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(v) => Some(*v),
            PropertyValue::Integer(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(v) => write!(f, "[I] {}", v),
            PropertyValue::Float(v) => write!(f, "[F] {}", v),
            PropertyValue::String(v) => write!(f, "[S] {}", v),
            PropertyValue::Boolean(v) => write!(f, "[B] {}", v),
        }
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

/// A property change reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyNotification {
    pub scope: PropertyScope,
    /// Name of the component that owns the property
    pub source: String,
    /// Property name; empty when every property was cleared
    pub name: String,
    /// `None` when the property was deleted
    pub value: Option<PropertyValue>,
}

impl PropertyNotification {
    /// True when this notification clears all properties of the scope
    pub fn is_clear_all(&self) -> bool {
        self.name.is_empty()
    }
}
