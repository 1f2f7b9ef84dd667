//! Verify requests and response handling against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each catalog case names a facade method, its arguments, and the path and
//! parameters the request must carry. Response cases pair a simulated
//! response with the expected result or error.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use ilkbyte_core::{
    ApiResult, CreateServer, CronSchedule, Credentials, DnsRecord, Error, HttpRequest,
    HttpResponse, Ilkbyte, ResponseBody, Transport,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";
const SECRET: &str = "vector-secret";
const ACCESS: &str = "vector-access";

/// Replies with a fixed response and remembers the last request.
#[derive(Clone)]
struct Recorder {
    status: u16,
    body: String,
    last: Arc<Mutex<Option<HttpRequest>>>,
}

impl Recorder {
    fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            last: Arc::default(),
        }
    }

    fn last(&self) -> HttpRequest {
        self.last.lock().unwrap().clone().expect("no request sent")
    }
}

impl Transport for Recorder {
    type Error = std::io::Error;

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, std::io::Error> {
        *self.last.lock().unwrap() = Some(request.clone());
        Ok(HttpResponse {
            status: self.status,
            headers: Vec::new(),
            body: self.body.clone(),
        })
    }
}

fn client(transport: Recorder) -> Ilkbyte<Recorder> {
    let creds = Credentials::new(BASE_URL, SECRET, ACCESS).unwrap();
    Ilkbyte::with_transport(creds, transport)
}

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args[key].as_str().unwrap_or_else(|| panic!("missing string arg {key}"))
}

fn num_arg(args: &Value, key: &str) -> u64 {
    args[key].as_u64().unwrap_or_else(|| panic!("missing numeric arg {key}"))
}

/// Call the facade method named by `operation` with arguments from `args`.
fn dispatch(c: &Ilkbyte<Recorder>, operation: &str, args: &Value) -> ApiResult<Recorder> {
    let page = || num_arg(args, "page") as u32;
    match operation {
        "get_account" => c.get_account(),
        "get_users" => c.get_users(),
        "get_all_servers" => c.get_all_servers(page()),
        "get_active_servers" => c.get_active_servers(page()),
        "get_plans" => c.get_plans(),
        "create_server" => {
            let input: CreateServer = serde_json::from_value(args.clone()).unwrap();
            c.create_server(&input)
        }
        "get_server" => c.get_server(str_arg(args, "server")),
        "set_power" => {
            let action = str_arg(args, "action").parse().unwrap();
            c.set_power(str_arg(args, "server"), action)
        }
        "get_ips" => c.get_ips(str_arg(args, "server")),
        "get_ip_logs" => c.get_ip_logs(str_arg(args, "server")),
        "set_ip_rdns" => c.set_ip_rdns(
            str_arg(args, "server"),
            str_arg(args, "ip"),
            str_arg(args, "rdns"),
        ),
        "get_snapshots" => c.get_snapshots(str_arg(args, "server")),
        "create_snapshot" => c.create_snapshot(str_arg(args, "server")),
        "restore_snapshot" => {
            c.restore_snapshot(str_arg(args, "server"), str_arg(args, "snapshot"))
        }
        "update_snapshot" => {
            c.update_snapshot(str_arg(args, "server"), str_arg(args, "snapshot"))
        }
        "delete_snapshot" => {
            c.delete_snapshot(str_arg(args, "server"), str_arg(args, "snapshot"))
        }
        "set_cron" => {
            let schedule: CronSchedule = serde_json::from_value(args.clone()).unwrap();
            c.set_cron(str_arg(args, "server"), &schedule)
        }
        "delete_cron" => c.delete_cron(str_arg(args, "server"), str_arg(args, "cron")),
        "get_backups" => c.get_backups(str_arg(args, "server")),
        "restore_backup" => c.restore_backup(str_arg(args, "server"), str_arg(args, "backup")),
        "get_domains" => c.get_domains(page()),
        "create_domain" => c.create_domain(
            str_arg(args, "domain"),
            str_arg(args, "server"),
            args["ipv6"].as_bool().unwrap(),
        ),
        "get_domain" => c.get_domain(str_arg(args, "domain")),
        "add_dns_record" => {
            let record: DnsRecord = serde_json::from_value(args.clone()).unwrap();
            c.add_dns_record(str_arg(args, "domain"), &record)
        }
        "update_dns_record" => c.update_dns_record(
            str_arg(args, "domain"),
            num_arg(args, "record_id"),
            str_arg(args, "content"),
            num_arg(args, "priority") as u32,
        ),
        "delete_dns_record" => {
            c.delete_dns_record(str_arg(args, "domain"), num_arg(args, "record_id"))
        }
        "dns_push" => c.dns_push(str_arg(args, "domain")),
        other => panic!("unknown operation in vectors: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[test]
fn catalog_test_vectors() {
    let raw = include_str!("../../test-vectors/catalog.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let transport = Recorder::new(200, "{}");
    let c = client(transport.clone());

    for case in vectors["cases"].as_array().unwrap() {
        let operation = case["operation"].as_str().unwrap();
        dispatch(&c, operation, &case["args"]).unwrap();
        let req = transport.last();

        assert_eq!(
            req.url,
            format!("{BASE_URL}{}", case["path"].as_str().unwrap()),
            "{operation}: url"
        );

        let mut sent: BTreeMap<String, String> = req.query.iter().cloned().collect();
        assert_eq!(sent.len(), req.query.len(), "{operation}: duplicate query keys");
        assert_eq!(sent.remove("secret").as_deref(), Some(SECRET), "{operation}: secret");
        assert_eq!(sent.remove("access").as_deref(), Some(ACCESS), "{operation}: access");

        let expected: BTreeMap<String, String> =
            serde_json::from_value(case["params"].clone()).unwrap();
        assert_eq!(sent, expected, "{operation}: params");
    }
}

#[test]
fn catalog_covers_every_operation() {
    let raw = include_str!("../../test-vectors/catalog.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let mut names: Vec<&str> = vectors["cases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|case| case["operation"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 27);
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let c = client(Recorder::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        ));

        let result = c.get_account();

        let Some(expected_error) = case.get("expected_error") else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
            continue;
        };

        let err = result.unwrap_err();
        match (expected_error["kind"].as_str().unwrap(), err) {
            ("Api", Error::Api { status, body }) => {
                let expected_status = expected_error["status"].as_u64().unwrap();
                assert_eq!(u64::from(status), expected_status, "{name}: status");
                if let Some(json) = expected_error.get("json_body") {
                    assert_eq!(body, ResponseBody::Json(json.clone()), "{name}: body");
                }
                if let Some(raw) = expected_error.get("raw_body") {
                    let raw = raw.as_str().unwrap().to_string();
                    assert_eq!(body, ResponseBody::Raw(raw), "{name}: body");
                }
            }
            ("Decode", Error::Decode(_)) => {}
            (kind, other) => panic!("{name}: expected {kind}, got {other:?}"),
        }
    }
}

#[test]
fn every_request_carries_default_headers() {
    let transport = Recorder::new(200, "{}");
    let c = client(transport.clone());
    c.get_plans().unwrap();

    let headers = transport.last().headers;
    assert!(headers.contains(&("Accept-Charset".to_string(), "utf-8".to_string())));
    assert!(headers.contains(&("Content-Type".to_string(), "application/json".to_string())));
    assert!(headers.contains(&("User-Agent".to_string(), "ilkbyte-rust-client".to_string())));
}
