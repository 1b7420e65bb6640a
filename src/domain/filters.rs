//! Equality filters applied to the fault report.

/// Optional status/severity constraints. A blank input imposes no constraint.
/// Non-blank values are kept byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    status: Option<String>,
    severity: Option<String>,
}

impl FilterSelection {
    pub fn new(status: Option<&str>, severity: Option<&str>) -> Self {
        Self {
            status: normalize(status),
            severity: normalize(severity),
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn severity(&self) -> Option<&str> {
        self.severity.as_deref()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.status.is_none() && self.severity.is_none()
    }

    /// Column/value pairs to AND together, status first.
    pub fn constraints(&self) -> Vec<(&'static str, &str)> {
        let mut constraints = Vec::with_capacity(2);
        if let Some(status) = self.status.as_deref() {
            constraints.push(("status", status));
        }
        if let Some(severity) = self.severity.as_deref() {
            constraints.push(("severity", severity));
        }
        constraints
    }
}

/// Whitespace-only input counts as unset; anything else is matched exactly.
fn normalize(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_owned)
}
