//! Absolute shape identifiers (`namespace#Name$member`)

use crate::{ConverterError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Namespace holding the shared primitive shapes
pub const PRELUDE_NAMESPACE: &str = "smithy.api";

/// Absolute identifier of a shape or of a member of a shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId {
    namespace: String,
    name: String,
    member: Option<String>,
}

impl ShapeId {
    /// Create an identifier from a namespace and a shape name
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            member: None,
        }
    }

    /// Identifier of a shape in the prelude namespace
    pub fn prelude(name: &str) -> Self {
        Self::new(PRELUDE_NAMESPACE, name)
    }

    /// Identifier of a member contained in this shape
    ///
    /// # Example
    /// ```rust,ignore
    /// let pet = ShapeId::new("ns.foo", "Pet");
    /// assert_eq!(pet.with_member("name").to_string(), "ns.foo#Pet$name");
    /// ```
    pub fn with_member(&self, member: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: Some(member.into()),
        }
    }

    /// Identifier with the member part removed
    pub fn container(&self) -> Self {
        Self::new(self.namespace.clone(), self.name.clone())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Whether this identifier points into the prelude namespace
    pub fn is_prelude(&self) -> bool {
        self.namespace == PRELUDE_NAMESPACE
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.name)?;
        if let Some(member) = &self.member {
            write!(f, "${}", member)?;
        }
        Ok(())
    }
}

impl FromStr for ShapeId {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ConverterError::InvalidShapeId(s.to_string());

        let (namespace, rest) = s.split_once('#').ok_or_else(invalid)?;
        let (name, member) = match rest.split_once('$') {
            Some((name, member)) => (name, Some(member)),
            None => (rest, None),
        };

        if namespace.is_empty()
            || !namespace.split('.').all(is_identifier)
            || !is_identifier(name)
            || member.is_some_and(|m| !is_identifier(m))
        {
            return Err(invalid());
        }

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            member: member.map(str::to_string),
        })
    }
}

impl Serialize for ShapeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether `text` is a valid identifier (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Reduce arbitrary text to a valid identifier
///
/// Characters outside `[A-Za-z0-9_]` are dropped and a leading digit is
/// prefixed with `_`. Empty input yields `_`.
pub fn sanitize_identifier(text: &str) -> String {
    let mut out: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Convert text such as `pet-owners` or `pet_owners` into `PetOwners`
pub fn to_pascal_case(text: &str) -> String {
    let mut result = String::new();
    let mut upper_next = true;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if upper_next {
                result.push(ch.to_ascii_uppercase());
                upper_next = false;
            } else {
                result.push(ch);
            }
        } else {
            upper_next = true;
        }
    }

    sanitize_identifier(&result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id = ShapeId::new("ns.foo", "Pet").with_member("name");
        assert_eq!(id.to_string(), "ns.foo#Pet$name");

        let parsed: ShapeId = "ns.foo#Pet$name".parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.container(), ShapeId::new("ns.foo", "Pet"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("Pet".parse::<ShapeId>().is_err());
        assert!("#Pet".parse::<ShapeId>().is_err());
        assert!("ns.foo#1Pet".parse::<ShapeId>().is_err());
        assert!("ns..foo#Pet".parse::<ShapeId>().is_err());
    }

    #[test]
    fn test_prelude() {
        assert!(ShapeId::prelude("String").is_prelude());
        assert!(!ShapeId::new("ns.foo", "String").is_prelude());
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("X-Rate-Limit"), "XRateLimit");
        assert_eq!(sanitize_identifier("2fa"), "_2fa");
        assert_eq!(sanitize_identifier("pet.id"), "petid");
        assert_eq!(sanitize_identifier("---"), "_");
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("pets"), "Pets");
        assert_eq!(to_pascal_case("pet-owners"), "PetOwners");
        assert_eq!(to_pascal_case("findByStatus"), "FindByStatus");
        assert_eq!(to_pascal_case("v1.2"), "V12");
    }
}
