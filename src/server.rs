use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{get, middleware, post, web, App, FromRequest, HttpRequest, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::db::UploadStore;
use crate::decoder::{CaptureDecoder, PcapFileDecoder};
use crate::error::AppError;
use crate::models::dto::{AnalysisContext, UploadDTO};
use crate::pipeline;

/// Shared handles for the request handlers.
pub struct AppState {
    pub store: UploadStore,
    pub decoder: Arc<dyn CaptureDecoder>,
    pub user_header: String,
}

impl AppState {
    pub fn new(store: UploadStore, decoder: Arc<dyn CaptureDecoder>, user_header: impl Into<String>) -> Self {
        Self {
            store,
            decoder,
            user_header: user_header.into(),
        }
    }
}

/// Identity established by the auth layer in front of this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

impl AuthenticatedUser {
    fn from_http(req: &HttpRequest) -> Result<Self, AppError> {
        let state = req
            .app_data::<web::Data<AppState>>()
            .ok_or_else(|| AppError::Internal("application state missing".into()))?;

        req.headers()
            .get(state.user_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| AuthenticatedUser(v.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http(req))
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/api/uploads")]
async fn list_uploads(state: web::Data<AppState>, user: AuthenticatedUser) -> impl Responder {
    let uploads: Vec<UploadDTO> = state
        .store
        .list_for(&user.0)
        .await
        .iter()
        .map(UploadDTO::from)
        .collect();
    HttpResponse::Ok().json(uploads)
}

#[derive(Deserialize)]
struct UploadQuery {
    file_name: Option<String>,
}

#[post("/api/uploads")]
async fn upload_capture(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let name = query.file_name.as_deref().unwrap_or_default();
    let upload = state.store.save(&user.0, name, &body).await?;
    Ok(HttpResponse::Created().json(UploadDTO::from(&upload)))
}

/// Last `page` value in a query string. Repeated or undecodable
/// parameters never fail the request.
fn requested_page(query_string: &str) -> Option<String> {
    web::Query::<Vec<(String, String)>>::from_query(query_string)
        .ok()?
        .into_inner()
        .into_iter()
        .filter(|(key, _)| key == "page")
        .map(|(_, value)| value)
        .last()
}

#[get("/api/uploads/{id}/analysis")]
async fn analysis(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    id: web::Path<u64>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let upload = state
        .store
        .get_for(id.into_inner(), &user.0)
        .await
        .ok_or(AppError::NotFound)?;
    debug!(id = upload.id, user = %user.0, "analysis requested");

    // decoding is blocking and can take a while on big captures
    let decoder = Arc::clone(&state.decoder);
    let path = upload.stored_path.clone();
    let page = requested_page(req.query_string());
    let result = web::block(move || pipeline::analyze(decoder.as_ref(), &path, page.as_deref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AnalysisContext {
        upload: UploadDTO::from(&upload),
        page_obj: (&result.page).into(),
        error: result.error,
    }))
}

/// Registers every route on an `App`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(list_uploads)
        .service(upload_capture)
        .service(analysis);
}

pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let store = UploadStore::open(&config.media_dir)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let addr = config
        .socket_addr()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let state = web::Data::new(AppState::new(
        store,
        Arc::new(PcapFileDecoder),
        config.user_header.clone(),
    ));
    let upload_limit = config.max_upload_bytes();

    info!(%addr, media = %config.media_dir.display(), "starting server");
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(upload_limit))
            .configure(routes)
    })
    .bind(addr)?
    .run()
    .await
}
