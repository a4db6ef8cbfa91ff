use std::{fmt, ops::Deref, str::FromStr};

use serde::{
    de::{self, Visitor},
    Deserialize, Serialize,
};

/// A glob that can be read from and written to config files as a plain string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern(glob::Pattern);

impl GlobPattern {
    pub fn parse(pattern: &str) -> Result<Self, glob::PatternError> {
        glob::Pattern::new(pattern).map(Self)
    }
}

impl FromStr for GlobPattern {
    type Err = glob::PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Deref for GlobPattern {
    type Target = glob::Pattern;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Serialize for GlobPattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for GlobPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct GlobVisitor;

        impl<'de> Visitor<'de> for GlobVisitor {
            type Value = GlobPattern;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a glob pattern string such as \"*.cpp\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                GlobPattern::parse(v).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(GlobVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Entry {
        pattern: GlobPattern,
    }

    #[test]
    fn toml_roundtrip_keeps_pattern_text() {
        let e: Entry = toml::from_str(r#"pattern = "*.[ch]pp""#).unwrap();
        assert!(e.pattern.matches("main.cpp"));
        assert!(e.pattern.matches("lib.hpp"));
        assert!(!e.pattern.matches("main.py"));
        assert!(toml::to_string(&e).unwrap().contains("*.[ch]pp"));
    }

    #[test]
    fn broken_pattern_is_rejected() {
        let res: Result<Entry, _> = toml::from_str(r#"pattern = "[a""#);
        assert!(dbg!(res).is_err());
        assert!("[a".parse::<GlobPattern>().is_err());
    }
}
