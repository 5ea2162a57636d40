//! Test support: an in-memory transport and PokéAPI-shaped fixtures.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::api::transport::{HttpResponse, Transport};
use crate::api::CatalogClient;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::storage::kv::KeyValueStore;

pub const BASE: &str = "http://stub/api/v2";

/// Serves canned JSON by URL and records every request
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, (u16, String)>>,
    offline: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: impl Into<String>, body: Value) {
        self.respond_status(url, 200, body);
    }

    pub fn respond_status(&self, url: impl Into<String>, status: u16, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), (status, body.to_string()));
    }

    /// Make `url` fail at the network level
    pub fn go_offline(&self, url: impl Into<String>) {
        self.offline.lock().unwrap().insert(url.into());
    }

    /// Register `/pokemon/{id}` (and `/pokemon/{name}`) for a fixture entry
    pub fn add_pokemon(&self, id: u32, name: &str, types: &[&str]) {
        let body = pokemon_json(id, name, types);
        self.respond(format!("{}/pokemon/{}", BASE, id), body.clone());
        self.respond(format!("{}/pokemon/{}", BASE, name), body);
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        // Let concurrently issued requests interleave like real I/O
        tokio::task::yield_now().await;

        if self.offline.lock().unwrap().contains(url) {
            return Err(CatalogError::Transport(format!(
                "Network request failed: {} unreachable",
                url
            )));
        }

        let route = self.routes.lock().unwrap().get(url).cloned();
        Ok(match route {
            Some((status, body)) => HttpResponse {
                status,
                status_text: if status == 200 { "OK" } else { "Error" }.to_string(),
                body,
            },
            None => HttpResponse {
                status: 404,
                status_text: "Not Found".to_string(),
                body: "Not Found".to_string(),
            },
        })
    }
}

/// A storage backend whose every operation fails
pub struct FailingKvStore;

impl KeyValueStore for FailingKvStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(CatalogError::Storage("disk unavailable".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(CatalogError::Storage("disk unavailable".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(CatalogError::Storage("disk unavailable".to_string()))
    }
}

pub fn client_with(stub: &Arc<StubTransport>) -> CatalogClient {
    CatalogClient::with_transport(CatalogConfig::new(BASE), stub.clone())
}

pub fn pokemon_json(id: u32, name: &str, types: &[&str]) -> Value {
    let types: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let url = format!("{}/type/{}/", BASE, t);
            json!({"slot": i + 1, "type": {"name": t, "url": url}})
        })
        .collect();
    json!({
        "id": id,
        "name": name,
        "types": types,
        "sprites": {
            "front_default": format!("https://img/sprites/{}.png", id),
            "other": {"official-artwork": {"front_default": format!("https://img/art/{}.png", id)}}
        }
    })
}

pub fn resource(kind: &str, id: u32, name: &str) -> Value {
    json!({"name": name, "url": format!("{}/{}/{}/", BASE, kind, id)})
}

/// A `/pokemon?limit&offset` body listing the given fixtures
pub fn list_json(count: u64, entries: &[(u32, &str)]) -> Value {
    let results: Vec<Value> = entries
        .iter()
        .map(|(id, name)| resource("pokemon", *id, name))
        .collect();
    json!({"count": count, "next": null, "previous": null, "results": results})
}

/// Register a list page plus every entry it references
pub fn add_page(
    stub: &StubTransport,
    limit: u32,
    offset: u32,
    count: u64,
    entries: &[(u32, &str)],
) {
    for (id, name) in entries {
        stub.add_pokemon(*id, name, &["normal"]);
    }
    stub.respond(
        format!("{}/pokemon?limit={}&offset={}", BASE, limit, offset),
        list_json(count, entries),
    );
}

pub fn species_json(chain_id: u32) -> Value {
    json!({"evolution_chain": {"url": format!("{}/evolution-chain/{}/", BASE, chain_id)}})
}

/// A linear chain (no branches) over the given species
pub fn linear_chain_json(chain_id: u32, species: &[(u32, &str)]) -> Value {
    fn link(species: &[(u32, &str)], depth: usize) -> Value {
        let (id, name) = species[0];
        let details = if depth == 0 {
            json!([])
        } else {
            json!([{"min_level": 16 * depth as u32, "trigger": {"name": "level-up", "url": ""}}])
        };
        let evolves_to = if species.len() > 1 {
            json!([link(&species[1..], depth + 1)])
        } else {
            json!([])
        };
        json!({
            "species": resource("pokemon-species", id, name),
            "evolution_details": details,
            "evolves_to": evolves_to
        })
    }
    json!({"id": chain_id, "chain": link(species, 0)})
}
