//! Cache Key Module
//!
//! Typed key parameters and composite key generation.
//!
//! A composite key is the base key followed by `__{name}_{value}` for every
//! parameter, in the order the caller supplied them. Parameter order is part
//! of the key: `[a, b]` and `[b, a]` address different entries, so call sites
//! must always pass their parameters in the same order.

use std::fmt;

/// Separator placed before each parameter name.
pub const PARAMETER_SEPARATOR: &str = "__";

/// Separator placed between a parameter name and its value.
pub const VALUE_SEPARATOR: &str = "_";

// == Key Value ==
/// A primitive value usable as part of a cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Absence of a value, rendered as the empty string
    Nothing,
}

impl fmt::Display for KeyValue {
    /// Writes the canonical text of the value.
    ///
    /// The output is deterministic for a given value since it takes part in
    /// key equality.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Str(s) => f.write_str(s),
            KeyValue::Int(i) => write!(f, "{}", i),
            KeyValue::UInt(u) => write!(f, "{}", u),
            // -0.0 equals 0.0 and must share its key text.
            KeyValue::Float(x) if *x == 0.0 => f.write_str("0"),
            KeyValue::Float(x) => write!(f, "{}", x),
            KeyValue::Bool(b) => write!(f, "{}", b),
            KeyValue::Nothing => Ok(()),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Str(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Str(value)
    }
}

impl From<&String> for KeyValue {
    fn from(value: &String) -> Self {
        KeyValue::Str(value.clone())
    }
}

impl From<char> for KeyValue {
    fn from(value: char) -> Self {
        KeyValue::Str(value.to_string())
    }
}

impl From<bool> for KeyValue {
    fn from(value: bool) -> Self {
        KeyValue::Bool(value)
    }
}

impl From<f32> for KeyValue {
    fn from(value: f32) -> Self {
        KeyValue::Float(f64::from(value))
    }
}

impl From<f64> for KeyValue {
    fn from(value: f64) -> Self {
        KeyValue::Float(value)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for KeyValue {
            fn from(value: $t) -> Self {
                KeyValue::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for KeyValue {
            fn from(value: $t) -> Self {
                KeyValue::UInt(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl<T: Into<KeyValue>> From<Option<T>> for KeyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeyValue::Nothing, Into::into)
    }
}

// == Cache Key Parameter ==
/// A named value contributing to a composite cache key.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKeyParameter {
    /// Role of the parameter, usually the name of the source variable
    pub name: String,
    /// The parameter's value
    pub value: KeyValue,
}

impl CacheKeyParameter {
    /// Creates a new parameter from any supported primitive.
    ///
    /// # Example
    /// ```
    /// use memocache::cache::CacheKeyParameter;
    ///
    /// let id = CacheKeyParameter::new("id", 42);
    /// assert_eq!(id.value.to_string(), "42");
    /// ```
    pub fn new(name: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// == Compose Key ==
/// Builds the lookup key for `base_key` and its ordered parameters.
pub fn compose_key(base_key: &str, parameters: &[CacheKeyParameter]) -> String {
    if parameters.is_empty() {
        return base_key.to_string();
    }

    let mut key = String::from(base_key);
    for parameter in parameters {
        key.push_str(PARAMETER_SEPARATOR);
        key.push_str(&parameter.name);
        key.push_str(VALUE_SEPARATOR);
        key.push_str(&parameter.value.to_string());
    }
    key
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_without_parameters() {
        assert_eq!(compose_key("users", &[]), "users");
    }

    #[test]
    fn test_compose_with_string_parameters() {
        let key = compose_key(
            "users",
            &[
                CacheKeyParameter::new("param1", "value1"),
                CacheKeyParameter::new("param2", "value2"),
            ],
        );
        assert_eq!(key, "users__param1_value1__param2_value2");
    }

    #[test]
    fn test_compose_with_int_parameters() {
        let key = compose_key(
            "users",
            &[
                CacheKeyParameter::new("param1", 100),
                CacheKeyParameter::new("param2", 999u64),
            ],
        );
        assert_eq!(key, "users__param1_100__param2_999");
    }

    #[test]
    fn test_compose_is_order_sensitive() {
        let a = CacheKeyParameter::new("p1", "a");
        let b = CacheKeyParameter::new("p2", "b");

        assert_ne!(
            compose_key("k", &[a.clone(), b.clone()]),
            compose_key("k", &[b, a])
        );
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(KeyValue::from(true).to_string(), "true");
        assert_eq!(KeyValue::from(false).to_string(), "false");
        assert_eq!(KeyValue::from(-7i32).to_string(), "-7");
        assert_eq!(KeyValue::from(1.5f64).to_string(), "1.5");
        assert_eq!(KeyValue::from(0.5f32).to_string(), "0.5");
        assert_eq!(KeyValue::from(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(KeyValue::from('x').to_string(), "x");
    }

    #[test]
    fn test_negative_zero_shares_key_with_zero() {
        assert_eq!(KeyValue::from(-0.0f64).to_string(), "0");
        assert_eq!(
            compose_key("k", &[CacheKeyParameter::new("x", -0.0f64)]),
            compose_key("k", &[CacheKeyParameter::new("x", 0.0f64)])
        );
    }

    #[test]
    fn test_nothing_renders_empty() {
        let missing: Option<i32> = None;
        let param = CacheKeyParameter::new("filter", missing);

        assert_eq!(param.value, KeyValue::Nothing);
        assert_eq!(compose_key("k", &[param]), "k__filter_");
    }

    #[test]
    fn test_option_some_converts_inner() {
        let param = CacheKeyParameter::new("page", Some(3u8));
        assert_eq!(param.value, KeyValue::UInt(3));
    }
}
