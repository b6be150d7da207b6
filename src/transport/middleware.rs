use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

pub async fn add_response_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        "Framecast-Version",
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}
