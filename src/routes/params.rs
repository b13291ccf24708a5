use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

/// Facet of the `date` list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    Today,
    #[serde(rename = "past_7_days")]
    Past7Days,
    ThisMonth,
    ThisYear,
}

impl DateFilter {
    /// Half-open `[start, end)` window in UTC, ending at the start of tomorrow.
    pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let start = match self {
            DateFilter::Today => today,
            DateFilter::Past7Days => today - Duration::days(7),
            DateFilter::ThisMonth => today.with_day(1).unwrap_or(today),
            DateFilter::ThisYear => {
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
            }
        };
        let end = today + Duration::days(1);
        (midnight(start), midnight(end))
    }
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}

/// Query string of every admin list screen. Filters that an entity does not declare are
/// rejected by its service.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Free-text search over the entity's search fields.
    pub q: Option<String>,
    pub softdelete: Option<bool>,
    pub date: Option<DateFilter>,
    pub user_id: Option<i32>,
}

impl AdminListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Target rows of a bulk admin action.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkActionRequest {
    pub ids: Vec<i32>,
}

/// One row of the list-editable `softdelete` column.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListEditRow {
    pub id: i32,
    pub softdelete: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListEditRequest {
    pub rows: Vec<ListEditRow>,
}

/// `?filename=` of a raw-body upload.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    pub filename: String,
}
