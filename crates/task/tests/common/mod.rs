#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use qr_sweep_task::{ConnectionFactory, SessionConnection};
use tower::ServiceExt;

/// What the fake database does when asked.
#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    /// Connection opens and the statement clears `n` rows.
    Clears(u64),
    /// Connection cannot be established.
    ConnectFails,
    /// Connection opens but the statement fails.
    QueryFails,
    /// Statement succeeds but closing the connection fails.
    CloseFails(u64),
}

/// Counts connection lifecycle events across all fake connections.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub connects: Arc<AtomicUsize>,
    pub statements: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl Counters {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> usize {
        self.statements.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// In-memory stand-in for the PostgreSQL connection factory.
pub struct FakeFactory {
    pub behaviour: Behaviour,
    pub counters: Counters,
}

impl FakeFactory {
    pub fn new(behaviour: Behaviour) -> (Self, Counters) {
        let counters = Counters::default();
        (
            Self {
                behaviour,
                counters: counters.clone(),
            },
            counters,
        )
    }
}

pub struct FakeConnection {
    behaviour: Behaviour,
    counters: Counters,
}

#[async_trait]
impl ConnectionFactory for FakeFactory {
    type Connection = FakeConnection;

    async fn connect(&self) -> Result<FakeConnection, sqlx::Error> {
        if let Behaviour::ConnectFails = self.behaviour {
            return Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection {
            behaviour: self.behaviour,
            counters: self.counters.clone(),
        })
    }
}

#[async_trait]
impl SessionConnection for FakeConnection {
    async fn clear_expired_qr_tokens(&mut self) -> Result<u64, sqlx::Error> {
        self.counters.statements.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Clears(n) | Behaviour::CloseFails(n) => Ok(n),
            Behaviour::QueryFails => Err(sqlx::Error::Protocol(
                "relation \"sessions\" does not exist".into(),
            )),
            Behaviour::ConnectFails => unreachable!("no connection was handed out"),
        }
    }

    async fn ping(&mut self) -> Result<(), sqlx::Error> {
        match self.behaviour {
            Behaviour::QueryFails => Err(sqlx::Error::Protocol("ping failed".into())),
            _ => Ok(()),
        }
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::CloseFails(_) => Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "broken pipe",
            ))),
            _ => Ok(()),
        }
    }
}

/// Send a request with an empty body through the router.
pub async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
