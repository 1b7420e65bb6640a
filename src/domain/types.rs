//! Category labels offered by the intake and report forms.
//!
//! Severity and status stay free-form text on the wire; these lists only
//! drive the dropdowns.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub const SEVERITY_OPTIONS: [CategoryOption; 4] = [
    CategoryOption {
        value: "low",
        label: "Low",
    },
    CategoryOption {
        value: "medium",
        label: "Medium",
    },
    CategoryOption {
        value: "high",
        label: "High",
    },
    CategoryOption {
        value: "critical",
        label: "Critical",
    },
];

pub const STATUS_OPTIONS: [CategoryOption; 3] = [
    CategoryOption {
        value: "open",
        label: "Open",
    },
    CategoryOption {
        value: "in_progress",
        label: "In progress",
    },
    CategoryOption {
        value: "resolved",
        label: "Resolved",
    },
];
