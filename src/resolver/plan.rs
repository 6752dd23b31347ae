// src/resolver/plan.rs

//! Result types for closure and self-host resolution

use super::ambiguity::AmbiguityRecord;
use super::depset::DependencySet;

/// Something worth reporting that did not stop resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No package in any acceptable arch provides the capability
    MissingProvider {
        capability: String,
        required_by: String,
    },
    /// A package tracked with `whatreqs` was selected
    PulledIn { package: String, parent: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MissingProvider {
                capability,
                required_by,
            } => write!(f, "No package for [{}] required by [{}]", capability, required_by),
            Diagnostic::PulledIn { package, parent } => {
                write!(f, "{} is pulled in by {}", package, parent)
            }
        }
    }
}

/// Runtime closure of a set of roots
#[derive(Debug, Clone, Default)]
pub struct Closure {
    pub packages: DependencySet,
    /// Ambiguities no resolved package settled
    pub ambiguities: Vec<AmbiguityRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Binary and source packages needed to rebuild a set of roots
#[derive(Debug, Clone, Default)]
pub struct SelfHostPlan {
    pub binaries: DependencySet,
    pub sources: DependencySet,
    pub ambiguities: Vec<AmbiguityRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_messages() {
        let missing = Diagnostic::MissingProvider {
            capability: "libfoo.so.1()(64bit)".to_string(),
            required_by: "app-1.0-1.x86_64".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "No package for [libfoo.so.1()(64bit)] required by [app-1.0-1.x86_64]"
        );

        let pulled = Diagnostic::PulledIn {
            package: "perl".to_string(),
            parent: "git".to_string(),
        };
        assert_eq!(pulled.to_string(), "perl is pulled in by git");
    }
}
