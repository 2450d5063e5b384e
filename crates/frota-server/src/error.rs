//! API error type and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use frota_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by a handler or an extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  /// The payload parsed but broke a field rule.
  #[error("validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Core(e) => match e {
        CoreError::InvalidCredentials(_) | CoreError::TokenInvalid(_) => StatusCode::UNAUTHORIZED,
        CoreError::AccountBlocked
        | CoreError::EmployeeInactive
        | CoreError::InsufficientRole(_) => StatusCode::FORBIDDEN,
        CoreError::DuplicateEmail { .. } | CoreError::NotAssociated { .. } => {
          StatusCode::BAD_REQUEST
        }
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::AssociationConflict { .. } => StatusCode::CONFLICT,
        CoreError::Internal(_) | CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      ApiError::Validation(problems) => json!({ "error": "validation failed", "fields": problems }),
      ApiError::Core(e @ (CoreError::Internal(_) | CoreError::Store(_))) => {
        tracing::error!(error = %e, "request failed");
        json!({ "error": "internal server error" })
      }
      ApiError::Core(e) => json!({ "error": e.to_string() }),
    };

    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use frota_core::{Domain, error::Missing, principal::PersonId};

  use super::*;

  async fn body_of(res: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[test]
  fn failure_kinds_map_to_statuses() {
    let cases: Vec<(CoreError, StatusCode)> = vec![
      (CoreError::InvalidCredentials(Domain::Person), StatusCode::UNAUTHORIZED),
      (CoreError::TokenInvalid(Domain::Employee), StatusCode::UNAUTHORIZED),
      (CoreError::AccountBlocked, StatusCode::FORBIDDEN),
      (CoreError::EmployeeInactive, StatusCode::FORBIDDEN),
      (CoreError::InsufficientRole("x"), StatusCode::FORBIDDEN),
      (
        CoreError::DuplicateEmail { domain: Domain::Employee, email: "a@b.c".into() },
        StatusCode::BAD_REQUEST,
      ),
      (CoreError::NotFound(Missing::Person(PersonId(4))), StatusCode::NOT_FOUND),
      (
        CoreError::AssociationConflict { individual: PersonId(1), organization: PersonId(2) },
        StatusCode::CONFLICT,
      ),
      (
        CoreError::NotAssociated { individual: PersonId(1), organization: PersonId(2) },
        StatusCode::BAD_REQUEST,
      ),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).status(), status);
    }
    assert_eq!(
      ApiError::Validation(vec!["email".into()]).status(),
      StatusCode::UNPROCESSABLE_ENTITY
    );
  }

  #[tokio::test]
  async fn unauthorized_carries_bearer_challenge() {
    let res = ApiError::from(CoreError::TokenInvalid(Domain::Person)).into_response();
    assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    assert_eq!(body_of(res).await["error"], "could not validate person credentials");
  }

  #[tokio::test]
  async fn store_detail_is_not_exposed() {
    let inner = std::io::Error::other("disk I/O error at page 7");
    let res = ApiError::from(CoreError::store(inner)).into_response();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_of(res).await;
    assert_eq!(body["error"], "internal server error");
    assert!(!body.to_string().contains("page 7"));
  }
}
