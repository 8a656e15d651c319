//! Field descriptors declared by source plugins.

use std::fmt;

use liblogger::log_warn;

/// Maximum length in bytes of a field name.
pub const FIELD_NAME_MAX_LEN: usize = 64;

/// Maximum length in bytes of a field description.
pub const FIELD_DESC_MAX_LEN: usize = 1024;

/// Semantic type of a plugin field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// NUL-terminated character data.
    String,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Float,
}

impl FieldType {
    /// Maps a schema `type` attribute to a field type.
    pub fn from_schema(name: &str) -> Option<Self> {
        match name {
            "string" => Some(FieldType::String),
            "integer" => Some(FieldType::Integer),
            "float" => Some(FieldType::Float),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a field value should be displayed. Plugin fields are always decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintFormat {
    #[default]
    Dec,
}

/// Text holding at most `N` bytes.
///
/// Longer input is cut at the last character boundary that fits and a
/// warning is logged; construction never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundedText<const N: usize>(String);

impl<const N: usize> BoundedText<N> {
    pub fn new(text: &str) -> Self {
        if text.len() <= N {
            return Self(text.to_string());
        }

        let mut end = N;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        log_warn!(
            &format!("text truncated from {} to {} bytes", text.len(), end),
            Some(text[..end].to_string())
        );
        Self(text[..end].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub const fn capacity() -> usize {
        N
    }
}

impl<const N: usize> fmt::Display for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type FieldName = BoundedText<FIELD_NAME_MAX_LEN>;
pub type FieldDescription = BoundedText<FIELD_DESC_MAX_LEN>;

/// One extractable field: name, description, type and display hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    name: FieldName,
    description: FieldDescription,
    field_type: FieldType,
    print_format: PrintFormat,
}

impl FieldInfo {
    pub fn new(name: &str, description: &str, field_type: FieldType) -> Self {
        Self {
            name: FieldName::new(name),
            description: FieldDescription::new(description),
            field_type,
            print_format: PrintFormat::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn print_format(&self) -> PrintFormat {
        self.print_format
    }
}
