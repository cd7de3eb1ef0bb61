use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::router::model::{ListQuery, UserInfo};
use crate::router::{Query, parse_date};
use crate::user::{DateRange, Page, PageRequest, UserService};

/// Handler to list users, optionally filtered by birth date.
pub async fn handler(
    State(users): State<UserService>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<UserInfo>>> {
    let page = PageRequest::lenient(query.page.as_deref(), query.size.as_deref());
    let range = DateRange::new(
        parse_date("from", query.from.as_deref())?,
        parse_date("to", query.to.as_deref())?,
    )?;

    let users = users.get_all(page, range).await?;

    Ok(Json(users.try_map(UserInfo::try_from)?))
}
