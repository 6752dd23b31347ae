// src/packages/capability.rs

//! Capabilities: the provides/requires vocabulary of RPM metadata
//!
//! A capability is a name with an optional version range (`foo >= 1.2`).
//! Two capabilities match when their names are equal and their ranges
//! overlap, using the same rules RPM applies when it compares a provide
//! against a requirement.

use crate::error::{Error, Result};
use crate::version::RpmVersion;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Version relation attached to a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Relation {
    /// Parse the `flags` attribute used in repodata (`LT`, `LE`, `EQ`, `GE`, `GT`)
    pub fn from_flags(flags: &str) -> Option<Self> {
        match flags {
            "LT" => Some(Self::Lt),
            "LE" => Some(Self::Le),
            "EQ" => Some(Self::Eq),
            "GE" => Some(Self::Ge),
            "GT" => Some(Self::Gt),
            _ => None,
        }
    }

    /// Parse an operator as written on the command line (`<`, `<=`, `=`, `>=`, `>`)
    pub fn from_operator(op: &str) -> Option<Self> {
        match op {
            "<" => Some(Self::Lt),
            "<=" | "=<" => Some(Self::Le),
            "=" | "==" => Some(Self::Eq),
            ">=" | "=>" => Some(Self::Ge),
            ">" => Some(Self::Gt),
            _ => None,
        }
    }

    pub fn operator(&self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }

    fn has_less(&self) -> bool {
        matches!(self, Self::Lt | Self::Le)
    }

    fn has_greater(&self) -> bool {
        matches!(self, Self::Gt | Self::Ge)
    }

    fn has_equal(&self) -> bool {
        matches!(self, Self::Le | Self::Eq | Self::Ge)
    }
}

/// A named capability with an optional version constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub range: Option<(Relation, RpmVersion)>,
}

impl Capability {
    /// An unversioned capability
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: None,
        }
    }

    pub fn versioned(name: impl Into<String>, relation: Relation, evr: RpmVersion) -> Self {
        Self {
            name: name.into(),
            range: Some((relation, evr)),
        }
    }

    /// Parse `name`, or `name OP evr` with whitespace around the operator
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [name] => Ok(Self::new(*name)),
            [name, op, evr] => {
                let relation = Relation::from_operator(op).ok_or_else(|| {
                    Error::ParseError(format!("Unknown relation '{}' in '{}'", op, s))
                })?;
                Ok(Self::versioned(*name, relation, RpmVersion::parse(evr)?))
            }
            _ => Err(Error::ParseError(format!("Malformed capability '{}'", s))),
        }
    }

    /// File-path capabilities are satisfied by package file lists
    pub fn is_file(&self) -> bool {
        self.name.starts_with('/')
    }

    /// Check whether two capabilities can be satisfied together
    ///
    /// An unversioned side matches any version of the other.
    pub fn overlaps(&self, other: &Capability) -> bool {
        if self.name != other.name {
            return false;
        }

        let (Some((a_rel, a_evr)), Some((b_rel, b_evr))) = (&self.range, &other.range) else {
            return true;
        };

        match a_evr.compare_for_match(b_evr) {
            Ordering::Less => a_rel.has_greater() || b_rel.has_less(),
            Ordering::Greater => a_rel.has_less() || b_rel.has_greater(),
            Ordering::Equal => {
                (a_rel.has_equal() && b_rel.has_equal())
                    || (a_rel.has_less() && b_rel.has_less())
                    || (a_rel.has_greater() && b_rel.has_greater())
            }
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.range {
            Some((relation, evr)) => write!(f, "{} {} {}", self.name, relation.operator(), evr),
            None => write!(f, "{}", self.name),
        }
    }
}
