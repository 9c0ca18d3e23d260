//! Remote method descriptors.
//!
//! A model declares a fixed table of [`MethodDescriptor`]s describing every
//! method it exposes over its verb-annotated RPC surface. The table is built
//! once when the model is constructed and never changes afterwards.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// HTTP verb annotation of a remote method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Head,
    Post,
    Put,
    Patch,
    #[serde(alias = "del")]
    Delete,
    All,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Head => "head",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown verb: {0}")]
pub struct UnknownVerb(pub String);

impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "head" => Ok(Self::Head),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" | "del" => Ok(Self::Delete),
            "all" => Ok(Self::All),
            other => Err(UnknownVerb(other.to_string())),
        }
    }
}

/// Scalar shape of a parameter or a result.
///
/// Structured model instances travel as [`ValueType::Json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Int,
    Float,
    Boolean,
    Id,
    Json,
}

/// One declared input parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub value_type: ValueType,
    #[serde(default)]
    pub required: bool,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            required: false,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputShape {
    pub value_type: ValueType,
    #[serde(default)]
    pub is_list: bool,
}

impl Default for OutputShape {
    fn default() -> Self {
        Self {
            value_type: ValueType::Json,
            is_list: false,
        }
    }
}

/// Introspectable metadata of a single remote method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub verb: Verb,
    pub is_static: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub accepts: Vec<ParamSpec>,
    #[serde(default)]
    pub returns: OutputShape,
}

impl MethodDescriptor {
    /// Start a descriptor for an instance method returning JSON.
    ///
    /// Call [`MethodDescriptor::static_method`] for methods that should be
    /// exposed as graph operations.
    pub fn new(name: impl Into<String>, verb: Verb) -> Self {
        Self {
            name: name.into(),
            verb,
            is_static: false,
            description: None,
            accepts: Vec::new(),
            returns: OutputShape::default(),
        }
    }

    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn accepts(mut self, param: ParamSpec) -> Self {
        self.accepts.push(param);
        self
    }

    #[must_use]
    pub fn returns(mut self, value_type: ValueType) -> Self {
        self.returns = OutputShape {
            value_type,
            is_list: false,
        };
        self
    }

    #[must_use]
    pub fn returns_list(mut self, value_type: ValueType) -> Self {
        self.returns = OutputShape {
            value_type,
            is_list: true,
        };
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.accepts.iter().find(|p| p.name == name)
    }
}
