//! Attribute registries
//!
//! Applicant and routing records are flat structs whose attributes are named
//! by a closed enum. The `attribute_record!` macro generates the struct, the
//! attribute enum and the accessor `match`, so every name the engine can look
//! up is backed by a real field and checked by the compiler.

use crate::error::Result;
use crate::value::Value;
use std::fmt;

/// A flat record whose attributes can be looked up by a closed attribute enum.
pub trait AttributeRecord {
    /// Closed set of attribute names this record can supply
    type Attribute: Copy + Eq + Ord + fmt::Debug + fmt::Display + 'static;

    /// Resolve an attribute name, `None` when the record cannot supply it
    fn resolve(name: &str) -> Option<Self::Attribute>;

    /// Read an attribute; absent values are `Value::Null`
    fn get(&self, attribute: Self::Attribute) -> Value;

    /// Write a stored attribute; computed attributes are rejected
    fn set(&mut self, attribute: Self::Attribute, value: &Value) -> Result<()>;

    /// Look up an attribute by name
    fn lookup(&self, name: &str) -> Option<Value> {
        Self::resolve(name).map(|attribute| self.get(attribute))
    }

    /// Set an attribute by name. Returns `Ok(false)` when the name is unknown
    /// to this record.
    fn apply_override(&mut self, name: &str, value: &Value) -> Result<bool> {
        match Self::resolve(name) {
            Some(attribute) => self.set(attribute, value).map(|_| true),
            None => Ok(false),
        }
    }

    /// Copy of this record with named attributes replaced. Names this record
    /// does not know are returned untouched.
    fn with_overrides<'a, I>(&self, overrides: I) -> Result<(Self, Vec<&'a str>)>
    where
        Self: Clone + Sized,
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut record = self.clone();
        let mut unknown = Vec::new();
        for (name, value) in overrides {
            if !record.apply_override(name, value)? {
                unknown.push(name.as_str());
            }
        }
        Ok((record, unknown))
    }
}

/// Conversion from a dynamic `Value` into a typed attribute field.
pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for u32 {
    const EXPECTED: &'static str = "non-negative integer";

    fn from_value(value: &Value) -> Option<Self> {
        value
            .as_f64()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
            .map(|n| n as u32)
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
            _ => None,
        }
    }
}

macro_rules! attribute_record {
    (
        $(#[$rmeta:meta])*
        pub struct $record:ident;

        $(#[$ameta:meta])*
        pub enum $attr:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty => $variant:ident, )+
        }

        computed {
            $( $(#[$cmeta:meta])* $cname:literal => $cvariant:ident = $cfn:path, )*
        }
    ) => {
        $(#[$rmeta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        pub struct $record {
            $(
                $(#[$fmeta])*
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )+
        }

        $(#[$ameta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $attr {
            $( $variant, )+
            $( $(#[$cmeta])* $cvariant, )*
        }

        impl $attr {
            /// Every attribute, stored attributes first
            pub const ALL: &'static [$attr] = &[$($attr::$variant,)+ $($attr::$cvariant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $( $attr::$variant => stringify!($field), )+
                    $( $attr::$cvariant => $cname, )*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                let name = name.trim();
                Self::ALL.iter().copied().find(|attribute| attribute.name() == name)
            }

            pub fn is_computed(self) -> bool {
                match self {
                    $( $attr::$variant => false, )+
                    $( $attr::$cvariant => true, )*
                }
            }
        }

        impl std::fmt::Display for $attr {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl $crate::attributes::AttributeRecord for $record {
            type Attribute = $attr;

            fn resolve(name: &str) -> Option<$attr> {
                $attr::from_name(name)
            }

            fn get(&self, attribute: $attr) -> $crate::value::Value {
                match attribute {
                    $( $attr::$variant => $crate::value::Value::from(self.$field.clone()), )+
                    $( $attr::$cvariant => $crate::value::Value::from($cfn(self)), )*
                }
            }

            fn set(
                &mut self,
                attribute: $attr,
                value: &$crate::value::Value,
            ) -> $crate::error::Result<()> {
                match attribute {
                    $(
                        $attr::$variant => {
                            if matches!(value, $crate::value::Value::Null) {
                                self.$field = None;
                                return Ok(());
                            }
                            let typed = <$ty as $crate::attributes::FromValue>::from_value(value)
                                .ok_or_else(|| $crate::error::CoreError::TypeError {
                                    attribute: stringify!($field).to_string(),
                                    expected: <$ty as $crate::attributes::FromValue>::EXPECTED,
                                    actual: value.type_name().to_string(),
                                })?;
                            self.$field = Some(typed);
                            Ok(())
                        }
                    )+
                    $(
                        $attr::$cvariant => Err($crate::error::CoreError::ReadOnlyAttribute(
                            $cname.to_string(),
                        )),
                    )*
                }
            }
        }
    };
}
