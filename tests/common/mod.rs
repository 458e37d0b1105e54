//! In-memory stand-in for the Bayrou Meter backend.
//!
//! Speaks the same JSON and status codes as the real service so the client, views and shell can be
//! exercised end to end without a network.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bayrou_meter::api::types::DEFAULT_QUESTION;
use bayrou_meter::api::{ApiClient, Method, Request, Response, Transport, TransportError};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

struct StoredUser {
    id: String,
    pseudo: String,
    email: String,
    password: String,
}

struct StoredVote {
    id: String,
    user_id: String,
    choice: String,
    created_at: NaiveDateTime,
}

#[derive(Default)]
struct Store {
    users: Vec<StoredUser>,
    votes: Vec<StoredVote>,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[derive(Default)]
pub struct FakeBackend {
    store: Mutex<Store>,
    requests: Mutex<Vec<Request>>,
    offline: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn client(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(self.clone())
    }

    /// While offline every request fails as if the connection was refused.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }

    pub fn vote_count(&self) -> usize {
        self.store.lock().unwrap().votes.len()
    }

    /// Removes a user while keeping their votes, like an account deleted on the server side.
    pub fn delete_user(&self, id: &str) {
        self.store.lock().unwrap().users.retain(|u| u.id != id);
    }

    fn handle(&self, request: &Request) -> (u16, Value) {
        let body = request.body.clone().unwrap_or(Value::Null);
        match (request.method, request.path) {
            (Method::Post, "/user") => self.create_user(&body),
            (Method::Post, "/login") => self.login(&body),
            (Method::Post, "/vote") => self.vote(&body),
            (Method::Get, "/votes") => self.list_votes(),
            _ => (404, json!({"error": "Not found"})),
        }
    }

    fn create_user(&self, body: &Value) -> (u16, Value) {
        let (pseudo, email, password) = match (field(body, "pseudo"), field(body, "email"), field(body, "password")) {
            (Some(p), Some(e), Some(w)) => (p, e, w),
            _ => return (400, json!({"error": "Pseudo, email and password are required"})),
        };

        let mut store = self.store.lock().unwrap();
        if store.users.iter().any(|u| u.email == email) {
            return (409, json!({"error": "Email already exists"}));
        }

        let id = store.next_id("user");
        store.users.push(StoredUser {
            id: id.clone(),
            pseudo: pseudo.clone(),
            email: email.clone(),
            password,
        });

        (201, json!({"status": "success", "user": {"id": id, "pseudo": pseudo, "email": email}}))
    }

    fn login(&self, body: &Value) -> (u16, Value) {
        let (email, password) = match (field(body, "email"), field(body, "password")) {
            (Some(e), Some(w)) => (e, w),
            _ => return (400, json!({"error": "Email and password are required"})),
        };

        let store = self.store.lock().unwrap();
        match store.users.iter().find(|u| u.email == email) {
            Some(u) if u.password == password => (
                200,
                json!({"status": "success", "user": {"id": u.id, "pseudo": u.pseudo, "email": u.email}}),
            ),
            _ => (401, json!({"error": "Invalid email or password"})),
        }
    }

    fn vote(&self, body: &Value) -> (u16, Value) {
        let (user_id, choice) = match (field(body, "user_id"), field(body, "choice")) {
            (Some(u), Some(c)) => (u, c.to_lowercase()),
            _ => return (400, json!({"error": "Both user_id and choice are required"})),
        };
        if choice != "oui" && choice != "non" {
            return (400, json!({"error": "Choice must be 'oui' or 'non'"}));
        }

        let mut store = self.store.lock().unwrap();
        if !store.users.iter().any(|u| u.id == user_id) {
            return (404, json!({"error": "User not found"}));
        }
        if store.votes.iter().any(|v| v.user_id == user_id) {
            return (409, json!({"error": "User has already voted"}));
        }

        let id = store.next_id("vote");
        let created_at = base_time() + Duration::seconds(store.next_id as i64);
        store.votes.push(StoredVote {
            id: id.clone(),
            user_id: user_id.clone(),
            choice: choice.clone(),
            created_at,
        });

        (
            201,
            json!({"status": "success", "vote": {"id": id, "user_id": user_id, "choice": choice, "question": DEFAULT_QUESTION}}),
        )
    }

    fn list_votes(&self) -> (u16, Value) {
        let store = self.store.lock().unwrap();

        let mut votes: Vec<&StoredVote> = store.votes.iter().collect();
        votes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let (mut oui, mut non, mut total) = (0u64, 0u64, 0u64);
        let mut listed = Vec::new();

        for vote in votes {
            let pseudo = match store.users.iter().find(|u| u.id == vote.user_id) {
                Some(u) => {
                    match vote.choice.as_str() {
                        "oui" => oui += 1,
                        _ => non += 1,
                    }
                    u.pseudo.clone()
                }
                None => "Utilisateur supprimé".to_owned(),
            };
            total += 1;

            listed.push(json!({
                "id": vote.id,
                "user": {"id": vote.user_id, "pseudo": pseudo},
                "choice": vote.choice,
                "question": DEFAULT_QUESTION,
                "created_at": vote.created_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            }));
        }

        let pct = |n: u64| {
            if total == 0 {
                json!(0)
            } else {
                json!(((n as f64 / total as f64) * 1000.0).round() / 10.0)
            }
        };

        (
            200,
            json!({
                "votes": listed,
                "stats": {
                    "oui": oui,
                    "non": non,
                    "total": total,
                    "oui_percentage": pct(oui),
                    "non_percentage": pct(non),
                },
                "question": DEFAULT_QUESTION,
            }),
        )
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        tokio::task::yield_now().await;
        self.requests.lock().unwrap().push(request.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Connect("connection refused".to_owned()));
        }

        let (status, body) = self.handle(&request);
        Ok(Response {
            status,
            body: serde_json::to_vec(&body).unwrap(),
        })
    }
}

fn field(body: &Value, name: &str) -> Option<String> {
    body.get(name)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 10)
        .and_then(|d| d.and_hms_opt(14, 0, 0))
        .unwrap()
}
