//! Response Envelope - Wire format shared by every endpoint
//!
//! 成功時: `{"status":"OK", ...}`
//! 失敗時: `{"status":"ERROR","code":"...","message":"..."}`

use std::borrow::Cow;

use serde::Serialize;

use super::kind::ErrorKind;

/// エンベロープのステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeStatus {
    Ok,
    Error,
}

/// 成功レスポンスのエンベロープ
///
/// `data` が `None` の場合はフィールドごと省略されます。
///
/// ## Examples
/// ```rust
/// use kernel::error::envelope::Envelope;
///
/// let body = serde_json::to_value(Envelope::ok()).unwrap();
/// assert_eq!(body, serde_json::json!({ "status": "OK" }));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl Envelope<()> {
    /// データなしの成功レスポンス
    pub fn ok() -> Self {
        Self {
            status: EnvelopeStatus::Ok,
            data: None,
        }
    }
}

impl<T> Envelope<T> {
    /// データ付きの成功レスポンス
    pub fn with_data(data: T) -> Self {
        Self {
            status: EnvelopeStatus::Ok,
            data: Some(data),
        }
    }
}

/// 失敗レスポンスのエンベロープ本体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub status: EnvelopeStatus,
    pub code: Cow<'static, str>,
    pub message: Cow<'static, str>,
}

/// 失敗レスポンス
///
/// HTTP ステータスは [`ErrorKind`] から導出されます。
/// ワイヤーに出る文字列はこの型を通してのみ生成されます。
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    kind: ErrorKind,
    envelope: ErrorEnvelope,
}

impl ErrorResponse {
    pub fn new(
        kind: ErrorKind,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            envelope: ErrorEnvelope {
                status: EnvelopeStatus::Error,
                code: code.into(),
                message: message.into(),
            },
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn envelope(&self) -> &ErrorEnvelope {
        &self.envelope
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for Envelope<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.envelope)).into_response()
    }
}
