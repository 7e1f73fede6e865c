use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use include_dir::{include_dir, Dir};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::{
    anthropic::ModelClient,
    codec::MediaType,
    error::ApiError,
    models::{Budget, Occasion, Season, Selections, MAX_STYLES, STYLES},
    pipeline::{self, GenerationForm, Upload},
    render,
    session::{SessionState, SessionStore, StoredResult},
};

static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub model: Arc<dyn ModelClient>,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/*path", get(static_asset))
        .route("/api/options", get(options))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/generate", post(generate_json))
        .route("/sessions/:id/generate", post(generate_html))
        .route("/sessions/:id/panels", get(panels))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn serve_static(path: &str) -> Response {
    match STATIC_DIR.get_file(path) {
        Some(file) => ([(header::CONTENT_TYPE, content_type_for(path))], file.contents()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn index() -> Response { serve_static("index.html") }

pub async fn static_asset(Path(path): Path<String>) -> Response { serve_static(&path) }

pub async fn options() -> Json<Value> {
    Json(json!({
        "styles": STYLES,
        "max_styles": MAX_STYLES,
        "occasions": Occasion::ALL,
        "seasons": Season::ALL,
        "budgets": Budget::ALL,
    }))
}

pub async fn create_session(State(state): State<AppState>) -> Json<SessionState> {
    let session = state.sessions.create();
    tracing::info!("🧍 New session {}", session.id);
    Json(session)
}

pub async fn get_session(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<SessionState>, ApiError> {
    state.sessions.get(&id).map(Json).ok_or(ApiError::NotFound)
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Collects the multipart form into a [`GenerationForm`]. Empty file inputs count as no upload.
async fn read_form(mut multipart: Multipart) -> Result<GenerationForm, ApiError> {
    let bad = |e: axum::extract::multipart::MultipartError| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
        _ => ApiError::BadRequest(e.to_string()),
    };
    let mut photo = None;
    let mut selections = Selections { styles: Vec::new(), ..Selections::default() };

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let declared = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad)?;
                if bytes.is_empty() {
                    continue;
                }
                let media_type = MediaType::resolve(declared.as_deref(), &bytes)
                    .ok_or_else(|| ApiError::BadRequest("unsupported image type, upload a JPG, PNG or WEBP photo".into()))?;
                photo = Some(Upload { bytes, media_type });
            }
            "styles" => {
                let text = field.text().await.map_err(bad)?;
                let style = text.trim();
                if style.is_empty() {
                    continue;
                }
                if !STYLES.contains(&style) {
                    return Err(ApiError::BadRequest(format!("unknown style '{}'", style)));
                }
                selections.styles.push(style.to_string());
            }
            "occasion" => selections.occasion = field.text().await.map_err(bad)?.parse()?,
            "season" => selections.season = field.text().await.map_err(bad)?.parse()?,
            "budget" => selections.budget = field.text().await.map_err(bad)?.parse()?,
            "body_notes" => selections.body_notes = non_empty(field.text().await.map_err(bad)?),
            "special_requests" => selections.special_requests = non_empty(field.text().await.map_err(bad)?),
            _ => {}
        }
    }

    if selections.styles.len() > MAX_STYLES {
        return Err(ApiError::BadRequest(format!("select at most {} styles", MAX_STYLES)));
    }
    Ok(GenerationForm { photo, selections })
}

async fn run(state: &AppState, id: &Uuid, multipart: Multipart) -> Result<StoredResult, ApiError> {
    let form = read_form(multipart).await?;
    pipeline::generate(&state.sessions, state.model.as_ref(), id, form).await
}

pub async fn generate_json(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<StoredResult>, ApiError> {
    run(&state, &id, multipart).await.map(Json)
}

pub async fn generate_html(Path(id): Path<Uuid>, State(state): State<AppState>, multipart: Multipart) -> Response {
    match run(&state, &id, multipart).await {
        Ok(stored) => Html(render::results(&stored)).into_response(),
        Err(e) => (e.status(), Html(render::error_notice(&e))).into_response(),
    }
}

pub async fn panels(Path(id): Path<Uuid>, State(state): State<AppState>) -> Response {
    match state.sessions.get(&id) {
        Some(session) => Html(render::panels(session.last.as_ref())).into_response(),
        None => {
            let err = ApiError::NotFound;
            (err.status(), Html(render::error_notice(&err))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::pipeline::testing::{StubModel, SAMPLE_OUTPUT};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    const BOUNDARY: &str = "XFITLABBOUNDARY";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part<'_>]) -> Body {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes());
                }
                Part::File(name, content_type, bytes) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"me.jpg\"\r\nContent-Type: {content_type}\r\n\r\n").as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn app(model: StubModel) -> (Router, SessionStore) {
        let sessions = SessionStore::default();
        let state = AppState { sessions: sessions.clone(), model: Arc::new(model) };
        (router(state, 1024 * 1024), sessions)
    }

    fn post_form(uri: String, parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(multipart(parts))
            .unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap()
    }

    async fn body_text(resp: Response) -> String {
        String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap()
    }

    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg";

    #[tokio::test]
    async fn session_lifecycle_over_json_api() {
        let (app, _) = app(StubModel::replying(SAMPLE_OUTPUT));

        let resp = app.clone()
            .oneshot(Request::builder().method("POST").uri("/api/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let session = body_json(resp).await;
        assert_eq!(session["selections"]["styles"], json!(["Minimalist"]));
        let id = session["id"].as_str().unwrap().to_string();

        let resp = app.clone()
            .oneshot(post_form(format!("/api/sessions/{id}/generate"), &[
                Part::File("photo", "image/jpeg", JPEG),
                Part::Text("styles", "Minimalist"),
                Part::Text("occasion", "Work"),
                Part::Text("season", "Autumn"),
                Part::Text("budget", "₹5K–10K"),
            ]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let stored = body_json(resp).await;
        assert_eq!(stored["result"]["outfits"][0]["name"], "Soft Tailoring");
        assert_eq!(stored["result"]["outfits"][0]["pieces"][0]["type"], "Top");
        assert_eq!(stored["selections"]["budget"], "₹5K–10K");

        let resp = app
            .oneshot(Request::builder().uri(format!("/api/sessions/{id}")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let session = body_json(resp).await;
        assert_eq!(session["has_photo"], true);
        assert_eq!(session["last"]["result"]["signature_piece"], "Camel coat");
    }

    #[tokio::test]
    async fn generating_without_photo_is_input_missing() {
        let (app, sessions) = app(StubModel::replying(SAMPLE_OUTPUT));
        let id = sessions.create().id;
        let resp = app
            .oneshot(post_form(format!("/api/sessions/{id}/generate"), &[Part::Text("styles", "Boho")]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({"error": "input_missing", "message": "Please upload a photo first."}));
    }

    #[tokio::test]
    async fn invalid_selections_are_rejected() {
        let (app, sessions) = app(StubModel::replying(SAMPLE_OUTPUT));
        let id = sessions.create().id;
        for parts in [
            vec![Part::Text("styles", "Cyberpunk")],
            vec![Part::Text("occasion", "Brunch")],
            vec![Part::Text("styles", "Boho"), Part::Text("styles", "Y2K"), Part::Text("styles", "Grunge"), Part::Text("styles", "Preppy")],
            vec![Part::File("photo", "text/plain", b"hello")],
        ] {
            let resp = app.clone().oneshot(post_form(format!("/api/sessions/{id}/generate"), &parts)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(resp).await["error"], "invalid_input");
        }
    }

    #[tokio::test]
    async fn service_error_maps_to_bad_gateway_and_keeps_result() {
        let (app, sessions) = app(StubModel::failing(ServiceError::Remote("HTTP 529: Overloaded".into())));
        let id = sessions.create().id;
        let resp = app
            .oneshot(post_form(format!("/sessions/{id}/generate"), &[Part::File("photo", "image/jpeg", JPEG)]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(resp).await.contains("Service error: HTTP 529: Overloaded"));
        assert!(sessions.get(&id).unwrap().last.is_none());
        assert!(sessions.get(&id).unwrap().has_photo);
    }

    #[tokio::test]
    async fn html_flow_renders_panels() {
        let (app, sessions) = app(StubModel::replying(SAMPLE_OUTPUT));
        let id = sessions.create().id;

        let resp = app.clone().oneshot(Request::builder().uri(format!("/sessions/{id}/panels")).body(Body::empty()).unwrap()).await.unwrap();
        assert!(body_text(resp).await.contains("Your Looks Await"));

        let resp = app.clone()
            .oneshot(post_form(format!("/sessions/{id}/generate"), &[Part::File("photo", "application/octet-stream", JPEG)]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("LOOK 03"));
        assert!(html.contains("Quiet Luxe Minimalist"));

        let resp = app.oneshot(Request::builder().uri(format!("/sessions/{id}/panels")).body(Body::empty()).unwrap()).await.unwrap();
        assert!(body_text(resp).await.contains("Soft Tailoring"));
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let (app, _) = app(StubModel::replying(SAMPLE_OUTPUT));
        let resp = app
            .oneshot(Request::builder().uri(format!("/api/sessions/{}", Uuid::new_v4())).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn options_and_static_assets_are_served() {
        let (app, _) = app(StubModel::replying(SAMPLE_OUTPUT));
        let resp = app.clone().oneshot(Request::builder().uri("/api/options").body(Body::empty()).unwrap()).await.unwrap();
        let opts = body_json(resp).await;
        assert_eq!(opts["styles"].as_array().unwrap().len(), 15);
        assert_eq!(opts["occasions"][2], "Date Night");
        assert_eq!(opts["budgets"][2], "₹5K–10K");

        let resp = app.clone().oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert!(body_text(resp).await.contains("FIT"));

        let resp = app.clone().oneshot(Request::builder().uri("/static/fitlab.css").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app.oneshot(Request::builder().uri("/static/missing.css").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_photo_is_payload_too_large() {
        let sessions = SessionStore::default();
        let model = Arc::new(StubModel::replying(SAMPLE_OUTPUT));
        let state = AppState { sessions: sessions.clone(), model: model.clone() };
        let app = router(state, 1024);
        let id = sessions.create().id;
        let photo = [JPEG, &[0u8; 4096][..]].concat();

        let resp = app.clone()
            .oneshot(post_form(format!("/api/sessions/{id}/generate"), &[Part::File("photo", "image/jpeg", &photo)]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(resp).await, json!({"error": "payload_too_large", "message": "photo too large, upload a smaller image"}));

        let resp = app
            .oneshot(post_form(format!("/sessions/{id}/generate"), &[Part::File("photo", "image/jpeg", &photo)]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body_text(resp).await.contains("Photo too large"));
        assert_eq!(model.calls(), 0);
        assert!(!sessions.get(&id).unwrap().has_photo);
    }
}
