//! Logical cache keys used by the list views.

use chrono::NaiveDate;

use crate::domain::BoardId;

pub const TIMESHEETS: &str = "timesheets_list";
pub const PROCUREMENT_ITEMS: &str = "procurement_items";
pub const PROCUREMENT_NON_GEM: &str = "procurement_non_gem";
pub const PROCUREMENT_CATEGORIES: &str = "procurement_categories";
pub const BOARD_TASKS: &str = "board_tasks";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimesheetScope {
    Mine,
    All,
}

impl TimesheetScope {
    pub fn as_str(self) -> &'static str {
        match self {
            TimesheetScope::Mine => "my",
            TimesheetScope::All => "all",
        }
    }
}

/// One key per filter combination, so switching filters never shows
/// another filter's rows.
pub fn timesheets(
    scope: TimesheetScope,
    start: NaiveDate,
    end: NaiveDate,
    status_filter: Option<&str>,
) -> String {
    format!(
        "{TIMESHEETS}_{}_{}_{}_{}",
        scope.as_str(),
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
        status_filter.unwrap_or("all"),
    )
}

/// Task list of one Kanban column.
pub fn board_tasks(board_id: BoardId) -> String {
    format!("{BOARD_TASKS}_{}", board_id.as_ulid())
}

/// Which list view a logical key belongs to, if any.
pub fn view_of(key: &str) -> Option<&'static str> {
    [PROCUREMENT_ITEMS, PROCUREMENT_NON_GEM, PROCUREMENT_CATEGORIES]
        .into_iter()
        .find(|view| key == *view)
        .or_else(|| {
            [TIMESHEETS, BOARD_TASKS]
                .into_iter()
                .find(|view| key.strip_prefix(view).is_some_and(|rest| rest.starts_with('_')))
        })
}
