//! Single binary web server: static assets from /static, rotation API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Set DATA_DIR to persist sessions on disk (restored at startup).

use actix_files::Files;
use actix_web::{
    delete, get, post,
    web::{Bytes, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use court_rotation_web::{
    DealMode, FileStore, MemoryStore, Player, Rank, RosterCounts, RotationError, RotationService,
    SessionId, SnapshotStore,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

type Service = RotationService<Box<dyn SnapshotStore>>;

/// Per-session entry: rotation service + last activity time (for auto-cleanup).
struct SessionEntry {
    service: Service,
    last_activity: Instant,
}

impl SessionEntry {
    fn new(service: Service) -> Self {
        Self {
            service,
            last_activity: Instant::now(),
        }
    }
}

/// Each session has its own lock so one session's disk writes don't stall the others.
type SharedEntry = Arc<Mutex<SessionEntry>>;

/// In-memory state: many sessions by ID. Entries are dropped after `session_timeout` inactivity.
type AppState = Data<RwLock<HashMap<SessionId, SharedEntry>>>;

/// Settings read from the environment at startup.
#[derive(Clone, Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    data_dir: Option<PathBuf>,
    session_timeout: Duration,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let data_dir = std::env::var("DATA_DIR")
            .ok()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from);
        let timeout_hours: u64 = std::env::var("SESSION_TIMEOUT_HOURS")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or_else(default_timeout_hours);
        Self {
            host,
            port,
            data_dir,
            session_timeout: Duration::from_secs(timeout_hours * 3600),
        }
    }

    /// Store for a session: on disk under DATA_DIR, else in memory.
    fn open_store(&self, id: SessionId) -> Box<dyn SnapshotStore> {
        if let Some(dir) = &self.data_dir {
            match FileStore::for_session(dir, id) {
                Ok(store) => return Box::new(store),
                Err(e) => log::warn!("session {} falls back to memory store: {}", id, e),
            }
        }
        Box::new(MemoryStore::new())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_hours() -> u64 {
    12
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct SummaryResponse<'a> {
    counts: RosterCounts,
    queue: Vec<&'a Player>,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    #[serde(default)]
    rank: Option<String>,
}

#[derive(Deserialize)]
struct DealBody {
    #[serde(default)]
    tier: Option<String>,
}

#[derive(Deserialize)]
struct SwapBody {
    player_id: Uuid,
}

#[derive(Deserialize)]
struct SummaryQuery {
    #[serde(default)]
    q: Option<String>,
}

/// Path segment: session id (e.g. /api/sessions/{id})
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

/// Path segments: session id and player id
#[derive(Deserialize)]
struct SessionPlayerPath {
    id: SessionId,
    player_id: Uuid,
}

/// Path segments: session id and zero-based court index
#[derive(Deserialize)]
struct SessionCourtPath {
    id: SessionId,
    court: usize,
}

/// Run `f` against a session, refreshing its activity time. 404 if unknown.
fn with_session<F>(state: &AppState, id: SessionId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Service) -> HttpResponse,
{
    let entry = match state.read() {
        Ok(g) => g.get(&id).cloned(),
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let Some(entry) = entry else {
        return HttpResponse::NotFound().json(serde_json::json!({ "error": "No session" }));
    };
    let mut entry = match entry.lock() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    entry.last_activity = Instant::now();
    f(&mut entry.service)
}

fn bad_request(error: impl std::fmt::Display, code: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": error.to_string(),
        "code": code,
    }))
}

fn rotation_error(e: RotationError) -> HttpResponse {
    bad_request(&e, e.code())
}

/// Deal mode from a request body: empty or no tier deals everyone.
fn deal_mode(body: &[u8]) -> Result<DealMode, HttpResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DealMode::All);
    }
    let body: DealBody = serde_json::from_slice(body)
        .map_err(|e| bad_request(format!("Invalid deal request: {}", e), "invalid_body"))?;
    match body.tier.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(DealMode::All),
        Some(tier) => tier
            .parse::<Rank>()
            .map(DealMode::Tier)
            .map_err(|e| bad_request(e, "unknown_tier")),
    }
}

fn session_response(service: &Service) -> HttpResponse {
    HttpResponse::Ok().json(service.session())
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-rotation-web",
    })
}

/// Create a new session (returns it with id; client stores id for subsequent requests).
#[post("/api/sessions")]
async fn api_create_session(state: AppState, config: Data<ServerConfig>) -> HttpResponse {
    let id = Uuid::new_v4();
    let service = RotationService::load(id, config.open_store(id));
    let body = serde_json::to_value(service.session());
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(id, Arc::new(Mutex::new(SessionEntry::new(service))));
    log::info!("Created session {}", id);
    match body {
        Ok(json) => HttpResponse::Ok().json(json),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Get a session by id (404 if not found).
#[get("/api/sessions/{id}")]
async fn api_get_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |s| session_response(s))
}

/// Roster counts and the queue filtered by `?q=` (case-insensitive name match).
#[get("/api/sessions/{id}/summary")]
async fn api_session_summary(
    state: AppState,
    path: Path<SessionPath>,
    query: Query<SummaryQuery>,
) -> HttpResponse {
    with_session(&state, path.id, |s| {
        let session = s.session();
        HttpResponse::Ok().json(SummaryResponse {
            counts: session.roster_counts(),
            queue: session.search_queue(query.q.as_deref().unwrap_or("")),
        })
    })
}

/// Add a player to the back of the queue.
#[post("/api/sessions/{id}/players")]
async fn api_add_player(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<AddPlayerBody>,
) -> HttpResponse {
    let rank = body.rank.as_deref().and_then(|r| r.parse::<Rank>().ok());
    with_session(&state, path.id, |s| match s.add_player(&body.name, rank) {
        Ok(_) => session_response(s),
        Err(e) => rotation_error(e),
    })
}

/// Remove a waiting player from the queue.
#[delete("/api/sessions/{id}/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<SessionPlayerPath>) -> HttpResponse {
    with_session(&state, path.id, |s| match s.remove_player(path.player_id) {
        Ok(_) => session_response(s),
        Err(e) => rotation_error(e),
    })
}

/// Deal waiting players onto open courts. Body `{"tier": "Intermediate"}` restricts to one rank.
#[post("/api/sessions/{id}/deal")]
async fn api_deal(state: AppState, path: Path<SessionPath>, body: Bytes) -> HttpResponse {
    let mode = match deal_mode(&body) {
        Ok(mode) => mode,
        Err(resp) => return resp,
    };
    with_session(&state, path.id, |s| match s.deal(mode) {
        Ok(_) => session_response(s),
        Err(e) => rotation_error(e),
    })
}

/// Finish the game on a court; its players rejoin the queue.
#[post("/api/sessions/{id}/courts/{court}/finish")]
async fn api_finish_game(state: AppState, path: Path<SessionCourtPath>) -> HttpResponse {
    with_session(&state, path.id, |s| match s.finish_game(path.court) {
        Ok(()) => session_response(s),
        Err(e) => rotation_error(e),
    })
}

/// Replace one player on a court with the next fair standby player.
#[post("/api/sessions/{id}/courts/{court}/swap")]
async fn api_swap_player(
    state: AppState,
    path: Path<SessionCourtPath>,
    body: Json<SwapBody>,
) -> HttpResponse {
    with_session(&state, path.id, |s| {
        match s.swap_player(path.court, body.player_id) {
            Ok(_) => session_response(s),
            Err(e) => rotation_error(e),
        }
    })
}

/// Toggle a court's lock flag.
#[post("/api/sessions/{id}/courts/{court}/lock")]
async fn api_toggle_lock(state: AppState, path: Path<SessionCourtPath>) -> HttpResponse {
    with_session(&state, path.id, |s| match s.toggle_lock(path.court) {
        Ok(locked) => {
            log::info!(
                "Court #{} {}",
                path.court + 1,
                if locked { "locked" } else { "unlocked" }
            );
            session_response(s)
        }
        Err(e) => rotation_error(e),
    })
}

/// Clear all players and locks.
#[post("/api/sessions/{id}/reset")]
async fn api_reset_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |s| {
        s.reset();
        session_response(s)
    })
}

/// Re-read the stored snapshot, replacing in-memory state.
#[post("/api/sessions/{id}/reload")]
async fn api_reload_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |s| {
        s.reload();
        session_response(s)
    })
}

/// Download every player as `Name,Rank,PlayCount` CSV.
#[get("/api/sessions/{id}/export")]
async fn api_export_csv(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.id, |s| match s.export_csv() {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                "attachment; filename=\"paddle_stacking_players.csv\"",
            ))
            .body(csv),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    })
}

/// Import players from a CSV request body.
#[post("/api/sessions/{id}/import")]
async fn api_import_csv(state: AppState, path: Path<SessionPath>, body: String) -> HttpResponse {
    with_session(&state, path.id, |s| {
        let imported = s.import_csv(&body);
        HttpResponse::Ok().json(serde_json::json!({
            "imported": imported,
            "session": s.session(),
        }))
    })
}

/// Sessions found under DATA_DIR, loaded from their snapshots.
fn restore_sessions(config: &ServerConfig) -> HashMap<SessionId, SharedEntry> {
    let mut sessions = HashMap::new();
    let Some(dir) = &config.data_dir else {
        return sessions;
    };
    match FileStore::list_sessions(dir) {
        Ok(ids) => {
            for id in ids {
                let service = RotationService::load(id, config.open_store(id));
                sessions.insert(id, Arc::new(Mutex::new(SessionEntry::new(service))));
            }
            log::info!("Restored {} session(s) from {}", sessions.len(), dir.display());
        }
        Err(e) => log::warn!("Could not list sessions in {}: {}", dir.display(), e),
    }
    sessions
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(restore_sessions(&config)));
    let config_data = Data::new(config.clone());

    // Background task: every 30 minutes, drop sessions inactive past the timeout
    let state_cleanup = state.clone();
    let timeout = config.session_timeout;
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| {
                entry
                    .lock()
                    .map(|e| e.last_activity.elapsed() < timeout)
                    .unwrap_or(false)
            });
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive session(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config_data.clone())
            .service(api_health)
            .service(api_create_session)
            .service(api_get_session)
            .service(api_session_summary)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_deal)
            .service(api_finish_game)
            .service(api_swap_player)
            .service(api_toggle_lock)
            .service(api_reset_session)
            .service(api_reload_session)
            .service(api_export_csv)
            .service(api_import_csv)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}
