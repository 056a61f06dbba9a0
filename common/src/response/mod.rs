use std::fmt::Debug;

use axum::body::Body;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{self, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

pub mod cep;

/// 错误信息返回体
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResMessage {
    pub message: String,
}

/// HTTP 返回数据, `data` 直接序列化为响应体
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub code: StatusCode,
    pub data: T,
}

impl<T: Serialize + Debug> ApiResponse<T> {
    pub fn response(data: T) -> Self {
        Self {
            code: StatusCode::OK,
            data,
        }
    }

    pub fn json(&self) -> Response {
        self.response_body()
    }

    pub fn response_body(&self) -> Response {
        let body = match serde_json::to_vec(&self.data) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!("response serialize err: {}, data: {:?}", err, self.data);
                return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
            }
        };

        http::Response::builder()
            .status(self.code)
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .header(CACHE_CONTROL, "no-cache")
            .body(Body::from(body))
            .map(IntoResponse::into_response)
            .unwrap_or_else(|err| {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            })
    }
}

impl ApiResponse<ResMessage> {
    pub fn fail_msg_code(code: StatusCode, message: String) -> Self {
        Self {
            code,
            data: ResMessage { message },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn response_body_carries_headers_and_json() {
        let response = ApiResponse::response(vec!["91420-270"]).json();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[CACHE_CONTROL], "no-cache");

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], br#"["91420-270"]"#);
    }
}
