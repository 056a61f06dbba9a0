use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS, CACHE_CONTROL,
};
use axum::http::{HeaderValue, Method, Request, Response as HttpResponse, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const ALLOW_METHODS: &str = "GET,PUT,PATCH,POST,OPTIONS";

/// 跨域守卫: 直接应答浏览器的 OPTIONS 预检请求, 其余请求补齐 CORS 头
pub async fn cors_guard<B>(req: Request<B>, next: Next<B>) -> Response {
    if req.method() == Method::OPTIONS {
        let allow_headers = req
            .headers()
            .get(ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("content-type"));

        return HttpResponse::builder()
            .status(StatusCode::NO_CONTENT)
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS)
            .header(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers)
            .header(ACCESS_CONTROL_MAX_AGE, "86400")
            .header(CACHE_CONTROL, "no-cache")
            .body(Body::empty())
            .map(IntoResponse::into_response)
            .unwrap_or_else(|_| StatusCode::NO_CONTENT.into_response());
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .entry(ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert(HeaderValue::from_static("*"));
    response
}
