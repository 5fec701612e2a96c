//! JSON API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::extract::ApiJson;
use super::server::AppState;
use crate::error::Result;
use crate::state::{DisplayConfig, Prize, User, WinnerRecord};

#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    pub phone: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrizeRequest {
    pub name: Option<String>,
    pub desc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRequest {
    /// Kept loose so a non-numeric id reads as "no prize selected"
    pub prize_id: Option<Value>,
    pub count: Option<i64>,
}

impl DrawRequest {
    pub fn prize_id(&self) -> Option<i64> {
        self.prize_id.as_ref().and_then(Value::as_i64)
    }

    /// Requested winner count, defaulting to one; negatives draw nobody
    pub fn count(&self) -> usize {
        let count = self.count.unwrap_or(1).max(0);
        usize::try_from(count).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRequest {
    pub theme: Option<String>,
    pub display_title: Option<String>,
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.registration.list_users().await?))
}

/// GET /api/users/available - users who have not won yet
pub async fn available_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.registration.available_users().await?))
}

/// POST /api/checkin
pub async fn check_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CheckinRequest>,
) -> Result<Json<Value>> {
    let user = state
        .registration
        .check_in(req.phone.as_deref(), req.name.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

/// GET /api/prizes
pub async fn list_prizes(State(state): State<AppState>) -> Result<Json<Vec<Prize>>> {
    Ok(Json(state.prizes.list().await?))
}

/// GET /api/prizes/:id
pub async fn get_prize(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Prize>> {
    Ok(Json(state.prizes.get(id).await?))
}

/// POST /api/prizes
pub async fn create_prize(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PrizeRequest>,
) -> Result<Json<Value>> {
    let prize = state
        .prizes
        .create(req.name.as_deref(), req.desc.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "prize": prize })))
}

/// PUT /api/prizes/:id
pub async fn update_prize(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<PrizeRequest>,
) -> Result<Json<Value>> {
    let prize = state
        .prizes
        .update(id, req.name.as_deref(), req.desc.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "prize": prize })))
}

/// DELETE /api/prizes/:id
pub async fn delete_prize(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.prizes.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/winners
pub async fn list_winners(State(state): State<AppState>) -> Result<Json<Vec<WinnerRecord>>> {
    Ok(Json(state.draws.list_winners().await?))
}

/// POST /api/draw
pub async fn draw(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DrawRequest>,
) -> Result<Json<Value>> {
    let outcome = state
        .draws
        .draw(req.prize_id(), req.count())
        .await?;
    Ok(Json(json!({ "success": true, "winners": outcome.winners })))
}

/// POST /api/reset
pub async fn reset(State(state): State<AppState>) -> Result<Json<Value>> {
    state.draws.reset().await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Result<Json<DisplayConfig>> {
    Ok(Json(state.config.get().await?))
}

/// PUT /api/config
pub async fn update_config(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ConfigRequest>,
) -> Result<Json<Value>> {
    let config = state.config.update(req.theme, req.display_title).await?;
    Ok(Json(json!({ "success": true, "config": config })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::create_shared_broadcaster;
    use crate::state::store::tests::temp_store;
    use crate::state::{create_shared_store, Store};
    use crate::web::server::build_router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    async fn app() -> Router {
        let store = Store::open(temp_store().path().to_path_buf()).await.unwrap();
        build_router(AppState::new(
            create_shared_store(store),
            create_shared_broadcaster(),
        ))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_checkin_twice_returns_existing_user() {
        let app = app().await;
        let body = json!({ "phone": "13812345678", "name": "Alice" });

        let (status, first) = send(&app, Method::POST, "/api/checkin", Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["success"], true);
        assert_eq!(first["user"]["phoneMask"], "138****5678");

        let (status, second) = send(&app, Method::POST, "/api/checkin", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(second["error"].is_string());
        assert_eq!(second["user"]["id"], first["user"]["id"]);

        let (_, users) = send(&app, Method::GET, "/api/users", None).await;
        assert_eq!(users.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkin_missing_name() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/checkin",
            Some(json!({ "phone": "13812345678" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_prize_crud() {
        let app = app().await;

        let (status, _) = send(&app, Method::DELETE, "/api/prizes/2", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, prizes) = send(&app, Method::GET, "/api/prizes", None).await;
        let prizes = prizes.as_array().unwrap();
        assert_eq!(prizes.len(), 3);
        assert!(prizes.iter().all(|p| p["id"] != 2));

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/prizes",
            Some(json!({ "name": "Mug" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["prize"]["desc"], "");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/prizes/999",
            Some(json!({ "name": "Ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::POST, "/api/prizes", Some(json!({ "desc": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_draw_flow() {
        let app = app().await;
        for (phone, name) in [("13800000001", "A"), ("13800000002", "B"), ("13800000003", "C")] {
            send(
                &app,
                Method::POST,
                "/api/checkin",
                Some(json!({ "phone": phone, "name": name })),
            )
            .await;
        }

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/draw",
            Some(json!({ "prizeId": 1, "count": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["winners"].as_array().unwrap().len(), 2);
        assert!(body["winners"][0]["userPhone"].as_str().unwrap().contains("****"));

        let (_, available) = send(&app, Method::GET, "/api/users/available", None).await;
        assert_eq!(available.as_array().unwrap().len(), 1);

        // Count defaults to one
        let (_, body) = send(&app, Method::POST, "/api/draw", Some(json!({ "prizeId": 3 }))).await;
        assert_eq!(body["winners"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::POST, "/api/draw", Some(json!({ "prizeId": 3 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, winners) = send(&app, Method::GET, "/api/winners", None).await;
        assert_eq!(winners.as_array().unwrap().len(), 3);

        let (status, _) = send(&app, Method::POST, "/api/draw", Some(json!({ "count": 1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reset_then_draw_fails() {
        let app = app().await;
        send(
            &app,
            Method::POST,
            "/api/checkin",
            Some(json!({ "phone": "13800000001", "name": "A" })),
        )
        .await;

        let (status, body) = send(&app, Method::POST, "/api/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, users) = send(&app, Method::GET, "/api/users", None).await;
        assert!(users.as_array().unwrap().is_empty());
        let (_, prizes) = send(&app, Method::GET, "/api/prizes", None).await;
        assert_eq!(prizes.as_array().unwrap().len(), 4);

        let (status, _) = send(&app, Method::POST, "/api/draw", Some(json!({ "prizeId": 1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_config_partial_update() {
        let app = app().await;

        let (_, before) = send(&app, Method::GET, "/api/config", None).await;
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/config",
            Some(json!({ "theme": "gold" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["config"]["theme"], "gold");
        assert_eq!(body["config"]["displayTitle"], before["displayTitle"]);

        let (_, after) = send(&app, Method::GET, "/api/config", None).await;
        assert_eq!(after["theme"], "gold");
    }

    async fn seed_guests(app: &Router, count: usize) {
        for i in 0..count {
            send(
                app,
                Method::POST,
                "/api/checkin",
                Some(json!({ "phone": format!("1390000000{}", i), "name": format!("Guest {}", i) })),
            )
            .await;
        }
    }

    #[tokio::test]
    async fn test_non_numeric_prize_id_asks_for_a_prize() {
        let app = app().await;
        seed_guests(&app, 2).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/draw",
            Some(json!({ "prizeId": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please select a prize");

        let (_, winners) = send(&app, Method::GET, "/api/winners", None).await;
        assert!(winners.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_count_draws_nobody() {
        let app = app().await;
        seed_guests(&app, 2).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/draw",
            Some(json!({ "prizeId": 1, "count": -1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["winners"].as_array().unwrap().is_empty());

        let (_, available) = send(&app, Method::GET, "/api/users/available", None).await;
        assert_eq!(available.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_bodies_use_error_envelope() {
        let app = app().await;

        // No content type at all
        let response = app
            .clone()
            .oneshot(
                Request::post("/api/checkin")
                    .body(Body::from("phone=13812345678&name=Alice"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());

        // Broken JSON
        let response = app
            .clone()
            .oneshot(
                Request::put("/api/config")
                    .header("content-type", "application/json")
                    .body(Body::from("{ theme"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Wrong field type
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/prizes",
            Some(json!({ "name": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/draw",
            Some(json!({ "prizeId": 1, "count": "two" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_draw_request_defaults() {
        let req: DrawRequest = serde_json::from_value(json!({ "prizeId": 3 })).unwrap();
        assert_eq!(req.prize_id(), Some(3));
        assert_eq!(req.count(), 1);

        let req: DrawRequest = serde_json::from_value(json!({ "prizeId": null, "count": 0 })).unwrap();
        assert_eq!(req.prize_id(), None);
        assert_eq!(req.count(), 0);
    }
}
