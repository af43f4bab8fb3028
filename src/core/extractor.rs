use std::convert::Infallible;

use axum::{
    body::Body,
    extract::{
        rejection::{FormRejection, JsonRejection},
        Form, FromRequest, FromRequestParts, OptionalFromRequestParts, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

/// Form extractor whose rejection is an `AppError::BadRequest`
///
/// Handlers that render their own error body map the rejection themselves.
pub struct AppForm<T>(pub T);

impl<T, S> FromRequest<S> for AppForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(form_rejection_error(rejection)),
        }
    }
}

fn form_rejection_error(rejection: FormRejection) -> AppError {
    match rejection {
        FormRejection::FailedToDeserializeForm(err) => {
            AppError::BadRequest(format!("Invalid form data: {}", err))
        }
        FormRejection::FailedToDeserializeFormBody(err) => {
            AppError::BadRequest(format!("Invalid form data: {}", err))
        }
        FormRejection::InvalidFormContentType(_) => {
            AppError::BadRequest("Expected a form-encoded body".to_string())
        }
        _ => AppError::BadRequest("Failed to parse form body".to_string()),
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// `Option<AuthenticatedUser>` for public routes that personalise their output
impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthenticatedUser>().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Router};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Deserialize)]
    struct QuantityForm {
        quantity: i64,
    }

    async fn echo_quantity(AppForm(form): AppForm<QuantityForm>) -> String {
        form.quantity.to_string()
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/quantity", post(echo_quantity))).unwrap()
    }

    #[tokio::test]
    async fn test_form_is_extracted() {
        let response = server().post("/quantity").form(&[("quantity", "3")]).await;
        response.assert_status_ok();
        response.assert_text("3");
    }

    #[tokio::test]
    async fn test_undeserializable_form_body_is_bad_request() {
        let response = server()
            .post("/quantity")
            .form(&[("quantity", "three")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid form data"));
    }

    #[tokio::test]
    async fn test_non_form_content_type_is_bad_request() {
        let response = server()
            .post("/quantity")
            .json(&serde_json::json!({ "quantity": 3 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Expected a form-encoded body");
    }
}
