use std::fmt;

use serde::Serialize;

use crate::errors::*;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{label}: {}", self.summary)?;
        if !self.detail.is_empty() {
            write!(f, "\n\n  {}", self.detail)?;
        }
        Ok(())
    }
}

// Diagnostics are how every entity operation reports problems back to its caller; an operation
// "failed" iff there is at least one error-severity entry.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics(vec![])
    }

    pub fn from_error(err: &anyhow::Error) -> Diagnostics {
        let mut diags = Diagnostics::new();
        diags.add_from_error(err);
        diags
    }

    pub fn add_error(&mut self, summary: &str, detail: &str) {
        self.push(Severity::Error, summary, detail);
    }

    pub fn add_warning(&mut self, summary: &str, detail: &str) {
        self.push(Severity::Warning, summary, detail);
    }

    pub fn add_from_error(&mut self, err: &anyhow::Error) {
        self.add_error(summarize(err), &format!("{err:#}"));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.0.iter().find(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    fn push(&mut self, severity: Severity, summary: &str, detail: &str) {
        self.0.push(Diagnostic {
            severity,
            summary: summary.into(),
            detail: detail.into(),
        });
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// Pick a summary line based on what kind of error we're looking at; the full chain always goes
// into the detail.
fn summarize(err: &anyhow::Error) -> &'static str {
    if let Some(perr) = err.downcast_ref::<ProviderError>() {
        return match perr {
            ProviderError::ResourceMissing(_) => "Resource missing",
            ProviderError::WaitTimeout(_) => "Timed out waiting for condition",
            ProviderError::Cancelled(_) => "Operation cancelled",
            ProviderError::OfflineMode(_) => "Provider is in offline mode",
            ProviderError::InvalidImportId(_) => "Invalid import ID",
            ProviderError::InvalidConfiguration(_) => "Invalid configuration",
            ProviderError::UnknownType(_) => "Unknown type",
        };
    }

    for cause in err.chain() {
        if cause.is::<kube::Error>() {
            return "Kubernetes API error";
        } else if cause.is::<serde_json::Error>() || cause.is::<serde_yaml::Error>() {
            return "Serialization error";
        }
    }
    "Unexpected error"
}
