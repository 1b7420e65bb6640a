//! Form payloads posted by the board page.
//!
//! Every field is optional so extraction never rejects a post; missing or
//! malformed values fall back to defaults here.

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{faults::NewFault, filters::FilterSelection};

fn board_or_fresh(raw: Option<&str>) -> Uuid {
    match raw.map(str::trim).map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        other => {
            debug!(
                target = "faultboard::http::forms",
                provided = other.is_some(),
                "board id missing or malformed; treating request as a new board"
            );
            Uuid::new_v4()
        }
    }
}

fn parse_page(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse().ok())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct BoardQuery {
    pub(super) page: Option<String>,
}

impl BoardQuery {
    pub(super) fn page(&self) -> u32 {
        parse_page(self.page.as_deref()).unwrap_or(1)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct IntakeForm {
    board: Option<String>,
    title: String,
    description: String,
    severity: String,
    status: String,
    photo_url: String,
}

impl IntakeForm {
    pub(super) fn board_id(&self) -> Uuid {
        board_or_fresh(self.board.as_deref())
    }

    /// The submitted values, unvalidated and untrimmed.
    pub(super) fn into_new_fault(self) -> NewFault {
        NewFault {
            title: self.title,
            description: self.description,
            severity: self.severity,
            status: self.status,
            photo_url: self.photo_url,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CursorForm {
    board: Option<String>,
    page: Option<String>,
    total_pages: Option<String>,
}

impl CursorForm {
    pub(super) fn board_id(&self) -> Uuid {
        board_or_fresh(self.board.as_deref())
    }

    pub(super) fn page(&self) -> u32 {
        parse_page(self.page.as_deref()).unwrap_or(1)
    }

    /// Page count rendered with the pager, if the client sent one back.
    pub(super) fn total_pages(&self) -> Option<u32> {
        parse_page(self.total_pages.as_deref()).filter(|total| *total > 0)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ReportForm {
    board: Option<String>,
    status: Option<String>,
    severity: Option<String>,
}

impl ReportForm {
    pub(super) fn board_id(&self) -> Uuid {
        board_or_fresh(self.board.as_deref())
    }

    pub(super) fn selection(&self) -> FilterSelection {
        FilterSelection::new(self.status.as_deref(), self.severity.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct BoardForm {
    board: Option<String>,
}

impl BoardForm {
    pub(super) fn board_id(&self) -> Uuid {
        board_or_fresh(self.board.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_fields_parse_leniently() {
        let form = CursorForm {
            board: Some("not-a-uuid".into()),
            page: Some(" 3 ".into()),
            total_pages: Some("0".into()),
        };
        assert_eq!(form.page(), 3);
        assert_eq!(form.total_pages(), None);
        assert_ne!(form.board_id(), Uuid::nil());

        let form = CursorForm::default();
        assert_eq!(form.page(), 1);
    }

    #[test]
    fn valid_board_ids_are_kept() {
        let id = Uuid::new_v4();
        let form = BoardForm {
            board: Some(id.to_string()),
        };
        assert_eq!(form.board_id(), id);
    }

    #[test]
    fn intake_values_are_passed_through_verbatim() {
        let form = IntakeForm {
            board: None,
            title: "  Leak ".into(),
            description: String::new(),
            severity: "high".into(),
            status: "open".into(),
            photo_url: String::new(),
        };
        let fault = form.into_new_fault();
        assert_eq!(fault.title, "  Leak ");
        assert_eq!(fault.photo_url, "");
    }
}
