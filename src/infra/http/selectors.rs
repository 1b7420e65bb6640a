pub(super) const FORM_MESSAGE: &str = "[data-region='fault-form-message']";
pub(super) const FAULT_LIST: &str = "[data-region='fault-list']";
pub(super) const PAGER: &str = "[data-region='pager']";
pub(super) const REPORT_FILTERS: &str = "[data-region='report-filters']";
pub(super) const REPORT_MESSAGE: &str = "[data-region='report-message']";
pub(super) const REPORT_BODY: &str = "[data-region='report-body']";
