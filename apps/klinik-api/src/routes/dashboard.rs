//! Dashboard summary endpoint.

use axum::extract::State;
use axum::Json;

use klinik_core::DashboardStats;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /dashboard`: today / this-month counts and sums plus recent activity,
/// using the server's local calendar.
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.db.dashboard().stats().await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_zero_state() {
        let app = test_app().await;

        let (status, body) = send(&app, Method::GET, "/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "total_patients_today": 0,
                "total_patients_this_month": 0,
                "total_sales_today": "0.00",
                "total_sales_this_month": "0.00",
                "recent_patients": [],
                "recent_sales": []
            })
        );
    }

    #[tokio::test]
    async fn test_new_sale_shows_up_today() {
        let app = test_app().await;
        send(
            &app,
            Method::POST,
            "/sales-transactions",
            Some(json!({"item_service_name": "Cabut Gigi", "price": "150000", "quantity": 1})),
        )
        .await;

        let (_, body) = send(&app, Method::GET, "/dashboard", None).await;
        assert_eq!(body["total_sales_today"], "150000.00");
        assert_eq!(body["recent_sales"][0]["item_service_name"], "Cabut Gigi");
    }
}
