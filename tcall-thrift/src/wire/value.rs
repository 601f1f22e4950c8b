use std::fmt;

use bytes::Bytes;

use super::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WireType {
    Bool,
    I8,
    Double,
    I16,
    I32,
    I64,
    Binary,
    Struct,
    Map,
    Set,
    List,
}

impl WireType {
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::Bool => 2,
            Self::I8 => 3,
            Self::Double => 4,
            Self::I16 => 6,
            Self::I32 => 8,
            Self::I64 => 10,
            Self::Binary => 11,
            Self::Struct => 12,
            Self::Map => 13,
            Self::Set => 14,
            Self::List => 15,
        }
    }

    /// Smallest number of bytes a value of this type can occupy on the wire.
    pub(super) fn min_encoded_len(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::Struct => 1,
            Self::I16 => 2,
            Self::I32 | Self::Binary => 4,
            Self::Set | Self::List => 5,
            Self::Map => 6,
            Self::Double | Self::I64 => 8,
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            2 => Ok(Self::Bool),
            3 => Ok(Self::I8),
            4 => Ok(Self::Double),
            6 => Ok(Self::I16),
            8 => Ok(Self::I32),
            10 => Ok(Self::I64),
            11 => Ok(Self::Binary),
            12 => Ok(Self::Struct),
            13 => Ok(Self::Map),
            14 => Ok(Self::Set),
            15 => Ok(Self::List),
            other => Err(DecodeError::UnknownType(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Bool(bool),
    I8(i8),
    Double(f64),
    I16(i16),
    I32(i32),
    I64(i64),
    Binary(Bytes),
    Struct(Struct),
    Map(MapItems),
    Set(ValueList),
    List(ValueList),
}

impl WireValue {
    #[must_use]
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Bool(_) => WireType::Bool,
            Self::I8(_) => WireType::I8,
            Self::Double(_) => WireType::Double,
            Self::I16(_) => WireType::I16,
            Self::I32(_) => WireType::I32,
            Self::I64(_) => WireType::I64,
            Self::Binary(_) => WireType::Binary,
            Self::Struct(_) => WireType::Struct,
            Self::Map(_) => WireType::Map,
            Self::Set(_) => WireType::Set,
            Self::List(_) => WireType::List,
        }
    }
}

/// Fields in the order they appeared on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Struct {
    pub fields: Vec<Field>,
}

impl Struct {
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{field}")?;
        }
        f.write_str("]")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: i16,
    pub value: WireValue,
}

impl Field {
    #[must_use]
    pub fn new(id: i16, value: WireValue) -> Self {
        Self { id, value }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{id:{} value:{:?}}}", self.id, self.value)
    }
}

/// Elements of a list or set, all tagged with `elem_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueList {
    pub elem_type: WireType,
    pub items: Vec<WireValue>,
}

impl ValueList {
    #[must_use]
    pub fn new(elem_type: WireType, items: Vec<WireValue>) -> Self {
        Self { elem_type, items }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapItems {
    pub key_type: WireType,
    pub value_type: WireType,
    pub items: Vec<(WireValue, WireValue)>,
}

impl MapItems {
    #[must_use]
    pub fn new(
        key_type: WireType,
        value_type: WireType,
        items: Vec<(WireValue, WireValue)>,
    ) -> Self {
        Self {
            key_type,
            value_type,
            items,
        }
    }
}
