use tracker_domain::{DateFilter, ExpenseGroup, GroupBy};

use super::{ApiClient, ApiError};

/// Parameters of `GET /expenses/summary/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryQuery {
    pub category: Option<String>,
    pub date_filter: DateFilter,
    pub view_by: GroupBy,
}

impl ApiClient {
    /// Server-grouped expenses. `All` and empty categories are not sent.
    pub fn expense_summary(&self, query: &SummaryQuery) -> Result<Vec<ExpenseGroup>, ApiError> {
        let category = query
            .category
            .clone()
            .filter(|name| !name.is_empty() && name != "All");
        let date_filter = match query.date_filter {
            DateFilter::All => None,
            other => Some(other.as_str().to_string()),
        };
        self.get_json(
            "/expenses/summary/",
            &[
                ("category", category),
                ("date_filter", date_filter),
                ("view_by", Some(query.view_by.as_str().to_string())),
            ],
        )
    }

    pub fn expense_categories(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("/expenses/categories/", &[])
    }
}
