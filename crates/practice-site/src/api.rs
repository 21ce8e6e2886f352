use practice_adaptive::capability::{ECT, SEC_CH_PREFERS_REDUCED_MOTION, SEC_CH_UA_MOBILE};
use practice_adaptive::{compute_decision, compute_profile, ClientHints};
use practice_edge_core::context::RequestContext;
use practice_edge_core::error::EdgeError;
use practice_edge_core::http::{header::VARY, HeaderName, HeaderValue, Response};
use practice_edge_core::response::{IntoResponse, Json};
use serde::Serialize;

/// Client hints `/api/loading-profile` asks browsers for.
pub const REQUESTED_HINTS: &str = "Sec-CH-UA-Mobile, ECT, Sec-CH-Prefers-Reduced-Motion";

#[derive(Serialize)]
struct SmokeTest {
    success: bool,
    data: SmokeTestData,
}

#[derive(Serialize)]
struct SmokeTestData {
    name: &'static str,
}

pub async fn smoke_test(_ctx: RequestContext) -> Result<Response, EdgeError> {
    Ok(Json(SmokeTest {
        success: true,
        data: SmokeTestData { name: "this works" },
    })
    .into_response())
}

/// Loading decision for the calling browser, computed from its client hints.
pub async fn loading_profile(ctx: RequestContext) -> Result<Response, EdgeError> {
    let hints = ClientHints::from_headers(ctx.headers());
    let decision = compute_decision(&compute_profile(hints.is_mobile(), &hints));

    let mut response = Json(decision).into_response();
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("accept-ch"),
        HeaderValue::from_static(REQUESTED_HINTS),
    );
    headers.insert(
        VARY,
        HeaderValue::from_str(&[SEC_CH_UA_MOBILE, ECT, SEC_CH_PREFERS_REDUCED_MOTION].join(", "))
            .map_err(EdgeError::internal)?,
    );
    Ok(response)
}
