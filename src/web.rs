use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::api::{normalize_pool_response, BackendClient, PoolPayload};
use crate::course::AnalysisCache;
use crate::display::format_person_label;
use crate::error::ClientError;
use crate::notify::{LogNotifier, Notifier};
use crate::registry::types::{de_flex_u32, de_flex_u8};
use crate::registry::{AddOutcome, SchedulerState};
use crate::snapshot;

// In-memory workbench state; a snapshot file stands in for a database.
pub struct AppState {
    pub scheduler: Mutex<SchedulerState>,
    pub course: Mutex<AnalysisCache>,
    pub backend: BackendClient,
    pub snapshot_path: String,
    pub notifier: Arc<dyn Notifier + Send + Sync>,
}

impl AppState {
    pub fn new(backend: BackendClient, snapshot_path: String) -> Self {
        AppState {
            scheduler: Mutex::new(SchedulerState::new()),
            course: Mutex::new(AnalysisCache::new()),
            backend,
            snapshot_path,
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Swaps the notification sink, e.g. for a recording sink in tests.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier + Send + Sync>) -> Self {
        self.notifier = notifier;
        self
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

// Day/period/week arrive from UI controls and may be strings; the flexible
// deserializers coerce either form to numbers.
#[derive(Deserialize)]
pub struct SlotRequest {
    #[serde(deserialize_with = "de_flex_u8")]
    day: u8,
    #[serde(deserialize_with = "de_flex_u8")]
    period: u8,
    person_id: String,
}

#[derive(Deserialize)]
pub struct ConflictRequest {
    #[serde(deserialize_with = "de_flex_u8")]
    day: u8,
    #[serde(deserialize_with = "de_flex_u8")]
    period: u8,
    #[serde(deserialize_with = "de_flex_u32")]
    week: u32,
    person_id: String,
}

#[derive(Deserialize)]
pub struct WeekRequest {
    #[serde(deserialize_with = "de_flex_u32")]
    week: u32,
}

#[derive(Serialize)]
struct GridCell {
    day: u8,
    period: u8,
    assigned: Vec<GridPerson>,
}

#[derive(Serialize)]
struct GridPerson {
    id: String,
    label: String,
    conflict: bool,
    reason: Option<String>,
}

fn session_token(session: &Session) -> Option<String> {
    session.get::<String>("token").ok().flatten()
}

/// Converts a boundary failure into a JSON response; nothing propagates
/// past a handler. A 401 from the backend also drops the local session.
fn client_error_response(state: &AppState, session: &Session, err: &ClientError) -> HttpResponse {
    let message = err.to_string();
    state.notifier.error(&message);
    match err {
        ClientError::SessionExpired => {
            session.purge();
            HttpResponse::Unauthorized().json(json!({"success": false, "error": message}))
        }
        ClientError::Validation(_) => {
            HttpResponse::BadRequest().json(json!({"success": false, "error": message}))
        }
        _ => HttpResponse::BadGateway().json(json!({"success": false, "error": message})),
    }
}

// --- Auth ---

async fn login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    match state.backend.login(&req.username, &req.password).await {
        Ok(token) => {
            session
                .insert("token", token)
                .map_err(actix_web::error::ErrorInternalServerError)?;
            state.notifier.success("signed in");
            Ok(HttpResponse::Ok().json(json!({"success": true, "message": "signed in"})))
        }
        Err(err) => Ok(client_error_response(&state, &session, &err)),
    }
}

async fn logout(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    session.purge();
    state.notifier.success("signed out");
    Ok(HttpResponse::Ok().json(json!({"success": true, "message": "signed out"})))
}

// --- Schedule upload ---

// Accepts one schedule file as the raw body (file name in X-File-Name) and
// forwards it to the remote parser. The pool is only replaced on a non-empty
// parse; an empty result is a warning, not an error, and leaves state alone.
async fn upload(
    req: HttpRequest,
    body: web::Bytes,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if body.is_empty() {
        state.notifier.warning("please select a file first");
        return Ok(HttpResponse::BadRequest()
            .json(json!({"success": false, "error": "please select a file first"})));
    }

    let file_name = req
        .headers()
        .get("X-File-Name")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("schedule.xlsx")
        .to_string();

    let token = session_token(&session);
    let response = state
        .backend
        .parse_schedules(token.as_deref(), vec![(file_name, body.to_vec())])
        .await;

    let raw = match response {
        Ok(raw) => raw,
        Err(err) => return Ok(client_error_response(&state, &session, &err)),
    };

    match normalize_pool_response(&raw) {
        PoolPayload::Records(people) => {
            let count = state.scheduler.lock().unwrap().load_pool(people);
            report_usage(&state, token.as_deref(), "scheduler").await;
            let message = format!("parsed schedules for {} people", count);
            state.notifier.success(&message);
            Ok(HttpResponse::Ok().json(json!({"success": true, "message": message, "count": count})))
        }
        PoolPayload::Empty => {
            state
                .notifier
                .warning("parse succeeded but returned no student data");
            Ok(HttpResponse::Ok().json(json!({
                "success": false,
                "warning": "parse succeeded but returned no student data"
            })))
        }
        PoolPayload::Malformed => {
            state.notifier.error("parser returned an unexpected payload");
            Ok(HttpResponse::BadGateway().json(json!({
                "success": false,
                "error": "parser returned an unexpected payload"
            })))
        }
    }
}

// Usage counters are fire-and-forget: a failed report must never fail the
// tool invocation that triggered it.
async fn report_usage(state: &AppState, token: Option<&str>, code: &str) {
    if let Err(err) = state.backend.report_tool_usage(token, code).await {
        log::debug!("usage report for '{}' skipped: {}", code, err);
    }
}

// --- Registry operations ---

async fn get_pool(state: web::Data<AppState>) -> Result<HttpResponse> {
    let scheduler = state.scheduler.lock().unwrap();
    Ok(HttpResponse::Ok().json(json!({
        "currentWeek": scheduler.current_week(),
        "pool": scheduler.pool(),
    })))
}

async fn get_grid(week: web::Path<u32>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let week = week.into_inner();
    let scheduler = state.scheduler.lock().unwrap();

    let mut cells: Vec<GridCell> = scheduler
        .assignments()
        .iter()
        .map(|(key, people)| GridCell {
            day: key.day,
            period: key.period,
            assigned: people
                .iter()
                .map(|p| {
                    let check = scheduler.check_conflict_by_id(&p.id, key.day, key.period, week);
                    GridPerson {
                        id: p.id.clone(),
                        label: format_person_label(p),
                        conflict: check.conflict,
                        reason: check.reason,
                    }
                })
                .collect(),
        })
        .collect();
    cells.sort_by_key(|c| (c.day, c.period));

    Ok(HttpResponse::Ok().json(json!({"week": week, "cells": cells})))
}

async fn assign(req: web::Json<SlotRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut scheduler = state.scheduler.lock().unwrap();

    let Some(person) = scheduler.find_person(&req.person_id).cloned() else {
        state.notifier.error("person not found in the current pool");
        return Ok(HttpResponse::BadRequest()
            .json(json!({"success": false, "error": "person not found in the current pool"})));
    };

    let name = person.name.clone();
    match scheduler.assign(req.day, req.period, person) {
        AddOutcome::Added => {
            let message = format!("added {}", name);
            state.notifier.success(&message);
            Ok(HttpResponse::Ok().json(json!({"success": true, "message": message})))
        }
        AddOutcome::Duplicate => {
            let message = format!("{} is already in that slot", name);
            state.notifier.warning(&message);
            Ok(HttpResponse::Ok().json(json!({"success": false, "warning": message})))
        }
    }
}

async fn unassign(req: web::Json<SlotRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut scheduler = state.scheduler.lock().unwrap();
    scheduler.unassign(req.day, req.period, &req.person_id);
    state.notifier.success("removed from slot");
    Ok(HttpResponse::Ok().json(json!({"success": true, "message": "removed from slot"})))
}

async fn conflict(
    req: web::Json<ConflictRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let scheduler = state.scheduler.lock().unwrap();
    let check = scheduler.check_conflict_by_id(&req.person_id, req.day, req.period, req.week);
    Ok(HttpResponse::Ok().json(check))
}

async fn set_week(req: web::Json<WeekRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut scheduler = state.scheduler.lock().unwrap();
    scheduler.set_current_week(req.week);
    Ok(HttpResponse::Ok().json(json!({"success": true, "currentWeek": req.week})))
}

async fn reset(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.scheduler.lock().unwrap().reset();
    state.notifier.success("workbench cleared");
    Ok(HttpResponse::Ok().json(json!({"success": true, "message": "workbench cleared"})))
}

// --- Snapshot persistence ---

async fn snapshot_save(state: web::Data<AppState>) -> Result<HttpResponse> {
    let scheduler = state.scheduler.lock().unwrap();
    match snapshot::save_state(&scheduler, &state.snapshot_path) {
        Ok(()) => {
            state.notifier.success("state saved");
            Ok(HttpResponse::Ok().json(json!({"success": true, "message": "state saved"})))
        }
        Err(err) => {
            let message = err.to_string();
            state.notifier.error(&message);
            Ok(HttpResponse::InternalServerError()
                .json(json!({"success": false, "error": message})))
        }
    }
}

async fn snapshot_load(state: web::Data<AppState>) -> Result<HttpResponse> {
    // Failed loads leave the in-memory state untouched.
    match snapshot::load_state(&state.snapshot_path) {
        Ok(loaded) => {
            let count = loaded.pool().len();
            *state.scheduler.lock().unwrap() = loaded;
            let message = format!("restored {} people from snapshot", count);
            state.notifier.success(&message);
            Ok(HttpResponse::Ok().json(json!({"success": true, "message": message})))
        }
        Err(err) => {
            let message = err.to_string();
            state.notifier.error(&message);
            Ok(HttpResponse::NotFound().json(json!({"success": false, "error": message})))
        }
    }
}

// --- Remote tool pass-throughs ---

async fn auto_schedule(
    req: web::Json<serde_json::Value>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let token = session_token(&session);
    match state.backend.auto_schedule(token.as_deref(), &req).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({"success": true, "result": result}))),
        Err(err) => Ok(client_error_response(&state, &session, &err)),
    }
}

async fn analyze(
    req: HttpRequest,
    body: web::Bytes,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if body.is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(json!({"success": false, "error": "please select a file first"})));
    }

    let file_name = req
        .headers()
        .get("X-File-Name")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("courses.xlsx")
        .to_string();

    let token = session_token(&session);
    match state
        .backend
        .analyze_course(token.as_deref(), file_name, body.to_vec())
        .await
    {
        Ok(result) => {
            state.course.lock().unwrap().store(result.clone());
            report_usage(&state, token.as_deref(), "course").await;
            state.notifier.success("course analysis complete");
            Ok(HttpResponse::Ok().json(json!({"success": true, "result": result})))
        }
        Err(err) => Ok(client_error_response(&state, &session, &err)),
    }
}

async fn get_analysis(state: web::Data<AppState>) -> Result<HttpResponse> {
    let course = state.course.lock().unwrap();
    match course.fresh_result() {
        Some(result) => Ok(HttpResponse::Ok().json(json!({"success": true, "result": result}))),
        None => Ok(HttpResponse::NotFound()
            .json(json!({"success": false, "error": "no fresh analysis available"}))),
    }
}

async fn community_stats(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let token = session_token(&session);
    match state.backend.tool_stats(token.as_deref()).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(stats)),
        Err(err) => Ok(client_error_response(&state, &session, &err)),
    }
}

async fn list_feedback(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let token = session_token(&session);
    match state.backend.list_feedback(token.as_deref()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(list)),
        Err(err) => Ok(client_error_response(&state, &session, &err)),
    }
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    content: String,
}

async fn submit_feedback(
    req: web::Json<FeedbackRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let token = session_token(&session);
    match state
        .backend
        .submit_feedback(token.as_deref(), &req.content)
        .await
    {
        Ok(()) => {
            state.notifier.success("feedback submitted");
            Ok(HttpResponse::Ok().json(json!({"success": true, "message": "feedback submitted"})))
        }
        Err(err) => Ok(client_error_response(&state, &session, &err)),
    }
}

// --- HTML page handlers ---

async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn login_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/login.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/login", web::get().to(login_page))
        .route("/api/login", web::post().to(login))
        .route("/api/logout", web::post().to(logout))
        .route("/api/upload", web::post().to(upload))
        .route("/api/pool", web::get().to(get_pool))
        .service(web::resource("/api/grid/{week}").route(web::get().to(get_grid)))
        .route("/api/assign", web::post().to(assign))
        .route("/api/unassign", web::post().to(unassign))
        .route("/api/conflict", web::post().to(conflict))
        .route("/api/week", web::post().to(set_week))
        .route("/api/reset", web::post().to(reset))
        .route("/api/snapshot/save", web::post().to(snapshot_save))
        .route("/api/snapshot/load", web::post().to(snapshot_load))
        .route("/api/auto-schedule", web::post().to(auto_schedule))
        .route("/api/analyze", web::post().to(analyze))
        .route("/api/analysis", web::get().to(get_analysis))
        .route("/api/community/stats", web::get().to(community_stats))
        .route("/api/community/feedback", web::get().to(list_feedback))
        .route("/api/community/feedback", web::post().to(submit_feedback));
}

/// Derives the cookie signing key from the configured secret.
fn session_key(secret: &str) -> Key {
    let secret = if secret.is_empty() { "duty-scheduler" } else { secret };
    let mut bytes = Vec::with_capacity(64);
    while bytes.len() < 64 {
        bytes.extend_from_slice(secret.as_bytes());
    }
    Key::derive_from(&bytes)
}

pub async fn start_server(
    port: u16,
    backend_url: String,
    session_secret: String,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(
        BackendClient::new(backend_url),
        "scheduler_state.json".to_string(),
    ));
    let key = session_key(&session_secret);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                key.clone(),
            ))
            .service(Files::new("/static", "static"))
            .configure(routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
