//! In-memory imitation of the Ilkbyte API.
//!
//! Every endpoint is a GET taking its arguments from the query string, and
//! every request must carry `secret` and `access` matching the keys the
//! server was started with. Responses use the envelope
//! `{"status": true, "message": ..., "data": ...}`; failures answer with a
//! non-2xx status and `{"status": false, "error": ...}`.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Servers and domains listed per page.
pub const PAGE_SIZE: usize = 10;

/// Host octets handed out from 192.0.2.0/24, one per created server.
const FIRST_HOST_OCTET: u16 = 10;
const LAST_HOST_OCTET: u16 = 254;

/// Key pair every request must present.
#[derive(Clone, Debug)]
pub struct MockCredentials {
    pub secret: String,
    pub access: String,
}

impl MockCredentials {
    pub fn new(secret: &str, access: &str) -> Self {
        Self {
            secret: secret.to_string(),
            access: access.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Server {
    pub name: String,
    pub username: String,
    pub os_id: u32,
    pub app_id: u32,
    pub package_id: u32,
    pub status: String,
    pub password_set: bool,
    pub ips: Vec<String>,
    pub rdns: BTreeMap<String, String>,
    pub ip_logs: Vec<String>,
    pub snapshots: Vec<Snapshot>,
    pub crons: Vec<Cron>,
    pub backups: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub name: String,
    pub revision: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Cron {
    pub name: String,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
}

#[derive(Clone, Debug, Serialize)]
pub struct Domain {
    pub domain: String,
    pub server: String,
    pub ipv6: bool,
    pub records: Vec<Record>,
    pub pending_changes: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Record {
    pub record_id: u64,
    pub record_name: String,
    pub record_type: String,
    pub record_content: String,
    pub record_priority: u32,
}

#[derive(Default)]
struct Store {
    servers: BTreeMap<String, Server>,
    domains: BTreeMap<String, Domain>,
    next_record_id: u64,
    next_ip: u16,
}

struct AppState {
    credentials: MockCredentials,
    store: RwLock<Store>,
}

type Shared = Arc<AppState>;
type QueryMap = Query<HashMap<String, String>>;
type ApiResponse = Result<Json<Value>, ApiFailure>;

/// Error answer: status code plus a message in the JSON body.
#[derive(Debug)]
struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(what: &str, name: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} {name} not found"))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = Json(json!({"status": false, "error": self.message}));
        (self.status, body).into_response()
    }
}

fn ok(message: &str, data: impl Serialize) -> ApiResponse {
    let data = serde_json::to_value(data)
        .map_err(|e| ApiFailure::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(json!({"status": true, "message": message, "data": data})))
}

fn required<'q>(query: &'q HashMap<String, String>, key: &str) -> Result<&'q str, ApiFailure> {
    query
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ApiFailure::bad_request(format!("missing parameter: {key}")))
}

fn required_num<N: std::str::FromStr>(
    query: &HashMap<String, String>,
    key: &str,
) -> Result<N, ApiFailure> {
    required(query, key)?
        .parse()
        .map_err(|_| ApiFailure::bad_request(format!("parameter {key} must be a number")))
}

fn page(query: &HashMap<String, String>) -> Result<usize, ApiFailure> {
    match query.get("p") {
        None => Ok(1),
        Some(raw) => match raw.parse::<usize>() {
            Ok(p) if p >= 1 => Ok(p),
            _ => Err(ApiFailure::bad_request("page must be a positive number")),
        },
    }
}

fn paginate<T>(items: Vec<T>, page: usize) -> Result<Vec<T>, ApiFailure> {
    let offset = page
        .saturating_sub(1)
        .checked_mul(PAGE_SIZE)
        .ok_or_else(|| ApiFailure::bad_request("page out of range"))?;
    Ok(items.into_iter().skip(offset).take(PAGE_SIZE).collect())
}

pub fn app(credentials: MockCredentials) -> Router {
    let state: Shared = Arc::new(AppState {
        credentials,
        store: RwLock::new(Store {
            next_record_id: 1,
            next_ip: FIRST_HOST_OCTET,
            ..Store::default()
        }),
    });

    let server_routes: Router<Shared> = Router::new()
        .route("/show", get(show_server))
        .route("/power", get(set_power))
        .route("/ip/list", get(list_ips))
        .route("/ip/logs", get(ip_logs))
        .route("/ip/rdns", get(set_rdns))
        .route("/snapshot", get(list_snapshots))
        .route("/snapshot/create", get(create_snapshot))
        .route("/snapshot/revert", get(revert_snapshot))
        .route("/snapshot/update", get(update_snapshot))
        .route("/snapshot/delete", get(delete_snapshot))
        .route("/snapshot/cron/add", get(add_cron))
        .route("/snapshot/cron/delete", get(delete_cron))
        .route("/backup", get(list_backups))
        .route("/backup/restore", get(restore_backup));

    let domain_routes: Router<Shared> = Router::new()
        .route("/show", get(show_domain))
        .route("/add", get(add_record))
        .route("/update", get(update_record))
        .route("/delete", get(delete_record))
        .route("/push", get(push_domain));

    Router::new()
        .route("/account", get(account))
        .route("/account/users", get(account_users))
        .route("/server/list/all", get(list_all_servers))
        .route("/server/list", get(list_active_servers))
        .route("/server/create", get(plans))
        .route("/server/create/config", get(create_server))
        .nest("/server/manage/{name}", server_routes)
        .route("/domain/list", get(list_domains))
        .route("/domain/create", get(create_domain))
        .nest("/domain/manage/{name}", domain_routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_keys))
        .with_state(state)
}

pub async fn run(
    listener: TcpListener,
    credentials: MockCredentials,
) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "ilkbyte mock server listening");
    }
    axum::serve(listener, app(credentials)).await
}

async fn require_keys(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let query = match Query::<HashMap<String, String>>::try_from_uri(request.uri()) {
        Ok(Query(query)) => query,
        Err(_) => return ApiFailure::bad_request("malformed query string").into_response(),
    };
    let authorized = query.get("secret") == Some(&state.credentials.secret)
        && query.get("access") == Some(&state.credentials.access);
    if !authorized {
        debug!(path = request.uri().path(), "rejecting request with bad keys");
        return ApiFailure::new(StatusCode::UNAUTHORIZED, "invalid secret or access key")
            .into_response();
    }
    next.run(request).await
}

// --- account ---

async fn account() -> ApiResponse {
    ok(
        "account",
        json!({"id": 1, "email": "owner@example.test", "balance": "0.00"}),
    )
}

async fn account_users() -> ApiResponse {
    ok(
        "users",
        json!([{"id": 1, "email": "owner@example.test", "role": "owner"}]),
    )
}

// --- servers ---

async fn list_all_servers(State(state): State<Shared>, Query(q): QueryMap) -> ApiResponse {
    let page = page(&q)?;
    let store = state.store.read().await;
    let servers: Vec<Server> = store.servers.values().cloned().collect();
    ok("servers", paginate(servers, page)?)
}

async fn list_active_servers(State(state): State<Shared>, Query(q): QueryMap) -> ApiResponse {
    let page = page(&q)?;
    let store = state.store.read().await;
    let servers: Vec<Server> = store
        .servers
        .values()
        .filter(|s| s.status == "running")
        .cloned()
        .collect();
    ok("servers", paginate(servers, page)?)
}

async fn plans() -> ApiResponse {
    ok(
        "plans",
        json!({
            "packages": [
                {"id": 1, "name": "small"},
                {"id": 2, "name": "medium"},
                {"id": 3, "name": "large"},
            ],
            "operating_systems": [{"id": 12, "name": "debian"}, {"id": 14, "name": "ubuntu"}],
            "applications": [{"id": 0, "name": "none"}, {"id": 5, "name": "docker"}],
        }),
    )
}

async fn create_server(State(state): State<Shared>, Query(q): QueryMap) -> ApiResponse {
    let name = required(&q, "name")?.to_string();
    let username = required(&q, "username")?.to_string();
    let os_id = required_num(&q, "os_id")?;
    let app_id = required_num(&q, "app_id")?;
    let package_id = required_num(&q, "package_id")?;
    required(&q, "sshkey")?;

    let mut store = state.store.write().await;
    if store.servers.contains_key(&name) {
        return Err(ApiFailure::new(
            StatusCode::CONFLICT,
            format!("server {name} already exists"),
        ));
    }
    if store.next_ip > LAST_HOST_OCTET {
        return Err(ApiFailure::new(StatusCode::CONFLICT, "no free addresses left"));
    }
    let ip = format!("192.0.2.{}", store.next_ip);
    store.next_ip += 1;

    let server = Server {
        name: name.clone(),
        username,
        os_id,
        app_id,
        package_id,
        status: "running".to_string(),
        password_set: q.contains_key("password"),
        ips: vec![ip.clone()],
        rdns: BTreeMap::new(),
        ip_logs: vec![format!("assigned {ip}")],
        snapshots: Vec::new(),
        crons: Vec::new(),
        backups: vec![format!("{name}-initial")],
    };
    store.servers.insert(name, server.clone());
    ok("server created", server)
}

async fn show_server(State(state): State<Shared>, Path(name): Path<String>) -> ApiResponse {
    let store = state.store.read().await;
    let server = store
        .servers
        .get(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    ok("server", server)
}

async fn set_power(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let action = required(&q, "set")?;
    let mut store = state.store.write().await;
    if !store.servers.contains_key(&name) {
        return Err(ApiFailure::not_found("server", &name));
    }
    let status = match action {
        "start" | "reboot" => "running",
        "shutdown" => "stopped",
        "destroy" => {
            store.servers.remove(&name);
            return ok("server destroyed", json!({"name": name}));
        }
        other => return Err(ApiFailure::bad_request(format!("unknown power action: {other}"))),
    };
    let server = store
        .servers
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    server.status = status.to_string();
    ok("power state changed", json!({"name": name, "status": status}))
}

async fn list_ips(State(state): State<Shared>, Path(name): Path<String>) -> ApiResponse {
    with_server(&state, &name, |s| {
        let ips: Vec<Value> = s
            .ips
            .iter()
            .map(|ip| json!({"ip": ip, "rdns": s.rdns.get(ip)}))
            .collect();
        json!(ips)
    })
    .await
}

async fn ip_logs(State(state): State<Shared>, Path(name): Path<String>) -> ApiResponse {
    with_server(&state, &name, |s| json!(s.ip_logs)).await
}

async fn set_rdns(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let ip = required(&q, "ip")?.to_string();
    let rdns = required(&q, "rdns")?.to_string();
    let mut store = state.store.write().await;
    let server = store
        .servers
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    if !server.ips.contains(&ip) {
        return Err(ApiFailure::not_found("ip", &ip));
    }
    server.rdns.insert(ip.clone(), rdns.clone());
    server.ip_logs.push(format!("rdns {ip} -> {rdns}"));
    ok("rdns updated", json!({"ip": ip, "rdns": rdns}))
}

async fn with_server<F>(state: &Shared, name: &str, view: F) -> ApiResponse
where
    F: FnOnce(&Server) -> Value,
{
    let store = state.store.read().await;
    let server = store
        .servers
        .get(name)
        .ok_or_else(|| ApiFailure::not_found("server", name))?;
    ok(name, view(server))
}

// --- snapshots & backups ---

async fn list_snapshots(State(state): State<Shared>, Path(name): Path<String>) -> ApiResponse {
    with_server(&state, &name, |s| json!({"snapshots": s.snapshots, "crons": s.crons})).await
}

async fn create_snapshot(State(state): State<Shared>, Path(name): Path<String>) -> ApiResponse {
    let mut store = state.store.write().await;
    let server = store
        .servers
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    let snapshot = Snapshot {
        name: format!("snapshot-{}", &Uuid::new_v4().simple().to_string()[..8]),
        revision: 1,
    };
    server.snapshots.push(snapshot.clone());
    ok("snapshot created", snapshot)
}

async fn revert_snapshot(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let snapshot = required(&q, "name")?;
    let store = state.store.read().await;
    let server = store
        .servers
        .get(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    let found = server
        .snapshots
        .iter()
        .find(|s| s.name == snapshot)
        .ok_or_else(|| ApiFailure::not_found("snapshot", snapshot))?;
    ok("snapshot restored", found)
}

async fn update_snapshot(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let snapshot = required(&q, "name")?;
    let mut store = state.store.write().await;
    let server = store
        .servers
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    let found = server
        .snapshots
        .iter_mut()
        .find(|s| s.name == snapshot)
        .ok_or_else(|| ApiFailure::not_found("snapshot", snapshot))?;
    found.revision += 1;
    ok("snapshot updated", found.clone())
}

async fn delete_snapshot(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let snapshot = required(&q, "name")?;
    let mut store = state.store.write().await;
    let server = store
        .servers
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    let before = server.snapshots.len();
    server.snapshots.retain(|s| s.name != snapshot);
    if server.snapshots.len() == before {
        return Err(ApiFailure::not_found("snapshot", snapshot));
    }
    ok("snapshot deleted", json!({"name": snapshot}))
}

async fn add_cron(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let cron = Cron {
        name: required(&q, "name")?.to_string(),
        day: required_num(&q, "day")?,
        hour: required_num(&q, "hour")?,
        min: required_num(&q, "min")?,
    };
    if cron.hour > 23 || cron.min > 59 {
        return Err(ApiFailure::bad_request("hour or min out of range"));
    }
    let mut store = state.store.write().await;
    let server = store
        .servers
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    server.crons.retain(|c| c.name != cron.name);
    server.crons.push(cron.clone());
    ok("cron added", cron)
}

async fn delete_cron(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let cron = required(&q, "name")?;
    let mut store = state.store.write().await;
    let server = store
        .servers
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    let before = server.crons.len();
    server.crons.retain(|c| c.name != cron);
    if server.crons.len() == before {
        return Err(ApiFailure::not_found("cron", cron));
    }
    ok("cron deleted", json!({"name": cron}))
}

async fn list_backups(State(state): State<Shared>, Path(name): Path<String>) -> ApiResponse {
    with_server(&state, &name, |s| json!(s.backups)).await
}

async fn restore_backup(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let backup = required(&q, "backup_name")?;
    let store = state.store.read().await;
    let server = store
        .servers
        .get(&name)
        .ok_or_else(|| ApiFailure::not_found("server", &name))?;
    if !server.backups.iter().any(|b| b == backup) {
        return Err(ApiFailure::not_found("backup", backup));
    }
    ok("backup restore started", json!({"server": name, "backup_name": backup}))
}

// --- domains & dns ---

async fn list_domains(State(state): State<Shared>, Query(q): QueryMap) -> ApiResponse {
    let page = page(&q)?;
    let store = state.store.read().await;
    let domains: Vec<Domain> = store.domains.values().cloned().collect();
    ok("domains", paginate(domains, page)?)
}

async fn create_domain(State(state): State<Shared>, Query(q): QueryMap) -> ApiResponse {
    let domain = required(&q, "domain")?.to_string();
    let server = required(&q, "server")?.to_string();
    let ipv6 = match required(&q, "ipv6")? {
        "True" | "true" | "1" => true,
        "False" | "false" | "0" => false,
        other => return Err(ApiFailure::bad_request(format!("invalid ipv6 flag: {other}"))),
    };

    let mut store = state.store.write().await;
    if !store.servers.contains_key(&server) {
        return Err(ApiFailure::not_found("server", &server));
    }
    if store.domains.contains_key(&domain) {
        return Err(ApiFailure::new(
            StatusCode::CONFLICT,
            format!("domain {domain} already exists"),
        ));
    }
    let created = Domain {
        domain: domain.clone(),
        server,
        ipv6,
        records: Vec::new(),
        pending_changes: false,
    };
    store.domains.insert(domain, created.clone());
    ok("domain created", created)
}

async fn show_domain(State(state): State<Shared>, Path(name): Path<String>) -> ApiResponse {
    let store = state.store.read().await;
    let domain = store
        .domains
        .get(&name)
        .ok_or_else(|| ApiFailure::not_found("domain", &name))?;
    ok("domain", domain)
}

const RECORD_TYPES: [&str; 6] = ["A", "AAAA", "CNAME", "MX", "TXT", "NS"];

async fn add_record(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let record_type = required(&q, "record_type")?;
    if !RECORD_TYPES.contains(&record_type) {
        return Err(ApiFailure::bad_request(format!(
            "unknown record type: {record_type}"
        )));
    }
    let record_name = required(&q, "record_name")?.to_string();
    let record_content = required(&q, "record_content")?.to_string();
    let record_priority = required_num(&q, "record_priority")?;

    let mut guard = state.store.write().await;
    let store = &mut *guard;
    let domain = store
        .domains
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("domain", &name))?;
    let record = Record {
        record_id: store.next_record_id,
        record_name,
        record_type: record_type.to_string(),
        record_content,
        record_priority,
    };
    store.next_record_id += 1;
    domain.records.push(record.clone());
    domain.pending_changes = true;
    ok("record added", record)
}

async fn update_record(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let record_id: u64 = required_num(&q, "record_id")?;
    let content = required(&q, "record_content")?.to_string();
    let priority = required_num(&q, "record_priority")?;

    let mut store = state.store.write().await;
    let domain = store
        .domains
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("domain", &name))?;
    let record = domain
        .records
        .iter_mut()
        .find(|r| r.record_id == record_id)
        .ok_or_else(|| ApiFailure::not_found("record", &record_id.to_string()))?;
    record.record_content = content;
    record.record_priority = priority;
    let updated = record.clone();
    domain.pending_changes = true;
    ok("record updated", updated)
}

async fn delete_record(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(q): QueryMap,
) -> ApiResponse {
    let record_id: u64 = required_num(&q, "record_id")?;
    let mut store = state.store.write().await;
    let domain = store
        .domains
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("domain", &name))?;
    let before = domain.records.len();
    domain.records.retain(|r| r.record_id != record_id);
    if domain.records.len() == before {
        return Err(ApiFailure::not_found("record", &record_id.to_string()));
    }
    domain.pending_changes = true;
    ok("record deleted", json!({"record_id": record_id}))
}

async fn push_domain(State(state): State<Shared>, Path(name): Path<String>) -> ApiResponse {
    let mut store = state.store.write().await;
    let domain = store
        .domains
        .get_mut(&name)
        .ok_or_else(|| ApiFailure::not_found("domain", &name))?;
    let pushed = domain.pending_changes;
    domain.pending_changes = false;
    ok("dns pushed", json!({"domain": name, "pushed": pushed}))
}
