use axum::extract::State;

use crate::db::{AppState, queries};
use crate::error::{OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::models::OrderWithItems;

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<OrderWithItems>> {
    let conn = state.db.get()?;
    let order = queries::get_order_with_items_by_number(&conn, &order_number)?
        .or_not_found(msg::ORDER_NOT_FOUND)?;
    Ok(Json(order))
}
