use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Raw detail of an internal error. Stashed on the response instead of the
/// body so the environment-aware layer in `app` decides whether it is
/// surfaced; the rendered body stays opaque by default.
#[derive(Debug, Clone)]
pub struct ErrorDetail(String);

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn with_message(message: &str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
        })
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, detail) = match &self {
            ApiError::Internal(source) => {
                error!(error = %source, "internal error");
                ("Server error".to_string(), Some(source.to_string()))
            }
            other => (other.to_string(), None),
        };
        let body = ErrorBody {
            success: false,
            message,
            error: None,
        };
        let mut resp = (status, Json(body)).into_response();
        if let Some(detail) = detail {
            resp.extensions_mut().insert(ErrorDetail(detail));
        }
        resp
    }
}

/// Rewrites an internal-error response so the body carries the raw detail.
/// Responses without a stashed detail pass through untouched.
pub fn reveal_error_detail(resp: Response) -> Response {
    let Some(ErrorDetail(detail)) = resp.extensions().get::<ErrorDetail>().cloned() else {
        return resp;
    };
    let body = ErrorBody {
        success: false,
        message: "Server error".to_string(),
        error: Some(detail),
    };
    (resp.status(), Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let resp = ApiResponse::with_message("Login successful", serde_json::json!({"id": 1}));
        let value = serde_json::to_value(&resp.0).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Login successful");
        assert_eq!(value["data"]["id"], 1);
    }

    #[test]
    fn message_envelope_omits_data() {
        let resp = ApiResponse::message("User deleted successfully");
        let value = serde_json::to_value(&resp.0).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("data").is_none());
    }

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation("studentId is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("Invalid credentials".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("Admin access required".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("Student not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn responses_render_with_expected_status() {
        let resp = ApiError::NotFound("Route not found".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_detail_is_hidden_by_default() {
        let resp = ApiError::Internal(anyhow::anyhow!("db timeout")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let value = body_json(resp).await;
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Server error");
        assert!(value.get("error").is_none());
    }

    #[tokio::test]
    async fn reveal_surfaces_internal_detail() {
        let resp = ApiError::Internal(anyhow::anyhow!("db timeout")).into_response();
        let resp = reveal_error_detail(resp);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let value = body_json(resp).await;
        assert_eq!(value["message"], "Server error");
        assert_eq!(value["error"], "db timeout");
    }

    #[tokio::test]
    async fn reveal_leaves_client_errors_untouched() {
        let resp = ApiError::Validation("studentId is required".into()).into_response();
        let resp = reveal_error_detail(resp);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let value = body_json(resp).await;
        assert_eq!(value["message"], "studentId is required");
        assert!(value.get("error").is_none());
    }
}
