//! Compiled per-method metadata: return type and declared exceptions.
//!
//! Normally generated from an interface definition; built by hand here.

use std::sync::Arc;

use crate::wire::WireType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("exception ID {0} declared more than once")]
    DuplicateExceptionId(i16),

    #[error("exception '{0}' uses reserved ID 0")]
    ReservedExceptionId(Arc<str>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    Enum(Arc<EnumSpec>),
    Struct(Arc<StructSpec>),
    List(Box<TypeSpec>),
    Set(Box<TypeSpec>),
    Map(Box<TypeSpec>, Box<TypeSpec>),
}

impl TypeSpec {
    #[must_use]
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Bool => WireType::Bool,
            Self::I8 => WireType::I8,
            Self::I16 => WireType::I16,
            Self::I32 | Self::Enum(_) => WireType::I32,
            Self::I64 => WireType::I64,
            Self::Double => WireType::Double,
            Self::String | Self::Binary => WireType::Binary,
            Self::Struct(_) => WireType::Struct,
            Self::List(_) => WireType::List,
            Self::Set(_) => WireType::Set,
            Self::Map(..) => WireType::Map,
        }
    }

    /// The name used for this type in the interface definition language.
    #[must_use]
    pub fn thrift_name(&self) -> String {
        match self {
            Self::Bool => "bool".to_string(),
            Self::I8 => "byte".to_string(),
            Self::I16 => "i16".to_string(),
            Self::I32 => "i32".to_string(),
            Self::I64 => "i64".to_string(),
            Self::Double => "double".to_string(),
            Self::String => "string".to_string(),
            Self::Binary => "binary".to_string(),
            Self::Enum(e) => e.name.to_string(),
            Self::Struct(s) => s.name.to_string(),
            Self::List(t) => format!("list<{}>", t.thrift_name()),
            Self::Set(t) => format!("set<{}>", t.thrift_name()),
            Self::Map(k, v) => format!("map<{}, {}>", k.thrift_name(), v.thrift_name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    pub name: Arc<str>,
    pub items: Vec<(Arc<str>, i32)>,
}

impl EnumSpec {
    #[must_use]
    pub fn item_name(&self, value: i32) -> Option<&Arc<str>> {
        self.items
            .iter()
            .find_map(|(name, v)| (*v == value).then_some(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StructKind {
    Struct,
    Union,
    Exception,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructSpec {
    pub name: Arc<str>,
    pub kind: StructKind,
    pub fields: Vec<FieldSpec>,
}

impl StructSpec {
    #[must_use]
    pub fn new(name: &str, kind: StructKind, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: Arc::from(name),
            kind,
            fields,
        }
    }

    #[must_use]
    pub fn field(&self, id: i16) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub id: i16,
    pub name: Arc<str>,
    pub ty: TypeSpec,
    pub required: bool,
}

impl FieldSpec {
    #[must_use]
    pub fn optional(id: i16, name: &str, ty: TypeSpec) -> Self {
        Self {
            id,
            name: Arc::from(name),
            ty,
            required: false,
        }
    }

    #[must_use]
    pub fn required(id: i16, name: &str, ty: TypeSpec) -> Self {
        Self {
            required: true,
            ..Self::optional(id, name, ty)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSpec {
    pub return_type: Option<TypeSpec>,
    pub exceptions: Vec<FieldSpec>,
}

impl ResultSpec {
    #[must_use]
    pub fn void() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn returning(ty: TypeSpec) -> Self {
        Self {
            return_type: Some(ty),
            exceptions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_exception(mut self, id: i16, name: &str, ty: TypeSpec) -> Self {
        self.exceptions.push(FieldSpec::optional(id, name, ty));
        self
    }
}

/// Metadata for a single remote method.
///
/// The id-to-exception table is built once here so that every response for the method can reuse
/// it.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    name: Arc<str>,
    result: Option<ResultSpec>,
    exceptions_by_id: ahash::AHashMap<i16, usize>,
}

impl FunctionSpec {
    pub fn new(name: &str, result: Option<ResultSpec>) -> Result<Self, SpecError> {
        let mut exceptions_by_id = ahash::AHashMap::new();
        if let Some(result) = &result {
            for (idx, ex) in result.exceptions.iter().enumerate() {
                if ex.id == 0 {
                    return Err(SpecError::ReservedExceptionId(ex.name.clone()));
                }
                if exceptions_by_id.insert(ex.id, idx).is_some() {
                    return Err(SpecError::DuplicateExceptionId(ex.id));
                }
            }
        }

        Ok(Self {
            name: Arc::from(name),
            result,
            exceptions_by_id,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn return_type(&self) -> Option<&TypeSpec> {
        self.result.as_ref()?.return_type.as_ref()
    }

    #[must_use]
    pub fn exceptions(&self) -> &[FieldSpec] {
        match &self.result {
            Some(r) => &r.exceptions,
            None => &[],
        }
    }

    #[must_use]
    pub fn exception(&self, id: i16) -> Option<&FieldSpec> {
        let idx = *self.exceptions_by_id.get(&id)?;
        self.exceptions().get(idx)
    }
}
