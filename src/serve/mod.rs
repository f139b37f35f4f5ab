//! Synchronous HTTP scoring service.
//!
//! Application code is a stateless request handler; connection handling is
//! the server library's. The model artifact is loaded once at startup,
//! shared read-only, and never mutated, so concurrent readers need no
//! locking.

pub mod metrics;

pub use metrics::ServiceMetrics;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;
use serde_json::json;
use tiny_http::{Header, Method, Response, Server};

use crate::error::ScoreError;
use crate::model::ModelArtifact;
use crate::pipeline::schema::LoanRecord;

/// Cap on accepted request bodies.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// One routed response, ready to be written back.
pub struct HttpReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpReply {
    fn json(status: u16, body: String) -> Self {
        HttpReply {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }).to_string())
    }
}

/// The scoring service: one artifact, one metrics collector.
pub struct ScoreService {
    artifact: Arc<ModelArtifact>,
    metrics: Arc<ServiceMetrics>,
}

impl ScoreService {
    pub fn new(artifact: ModelArtifact) -> Self {
        ScoreService {
            artifact: Arc::new(artifact),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// Shared metrics handle (used by tests and the run loop).
    pub fn metrics(&self) -> Arc<ServiceMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Route one request to a reply. Pure with respect to the connection, so
    /// tests can exercise it without a socket.
    pub fn handle(&self, method: &Method, url: &str, body: &str) -> HttpReply {
        let path = url.split('?').next().unwrap_or(url);

        match (method, path) {
            (&Method::Get, "/") | (&Method::Get, "/health") => {
                HttpReply::json(200, json!({ "status": "ok" }).to_string())
            }
            (&Method::Get, "/metrics") => HttpReply {
                status: 200,
                content_type: "text/plain; version=0.0.4",
                body: self.metrics.render_prometheus(),
            },
            (&Method::Post, "/predict") => self.handle_predict(body),
            _ => HttpReply::error(404, "not found"),
        }
    }

    fn handle_predict(&self, body: &str) -> HttpReply {
        let started = Instant::now();

        let record: LoanRecord = match serde_json::from_str(body) {
            Ok(record) => record,
            Err(e) => {
                self.metrics.record_client_error();
                return HttpReply::error(422, &format!("invalid request body: {}", e));
            }
        };

        match self.artifact.predict(&record) {
            Ok(prediction) => {
                self.metrics
                    .record_prediction(started.elapsed(), prediction.probability);
                HttpReply::json(
                    200,
                    json!({
                        "probability": prediction.probability,
                        "defaulted": prediction.defaulted,
                    })
                    .to_string(),
                )
            }
            Err(e @ ScoreError::Validation(_)) | Err(e @ ScoreError::DataFormat(_)) => {
                self.metrics.record_client_error();
                HttpReply::error(e.status_code(), &e.to_string())
            }
            Err(e) => HttpReply::error(500, &e.to_string()),
        }
    }

    /// Accept loop: read each request body, route it, write the reply.
    pub fn run(&self, addr: &str) -> Result<()> {
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;

        println!(
            "    {} Scoring service listening on {}",
            style("✓").green().bold(),
            style(addr).cyan()
        );
        println!(
            "      POST /predict  GET /health  GET /metrics  (model v{}, {} features)",
            self.artifact.crate_version,
            self.artifact.feature_names.len()
        );

        for mut request in server.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_string();

            let mut body = String::new();
            let reply = match request
                .as_reader()
                .take(MAX_BODY_BYTES as u64 + 1)
                .read_to_string(&mut body)
            {
                Ok(_) if body.len() > MAX_BODY_BYTES => HttpReply::error(413, "request body too large"),
                Ok(_) => self.handle(&method, &url, &body),
                Err(e) => HttpReply::error(400, &format!("unreadable request body: {}", e)),
            };

            let header = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
                .unwrap();
            let response = Response::from_string(reply.body)
                .with_status_code(reply.status)
                .with_header(header);

            if let Err(e) = request.respond(response) {
                eprintln!("    failed to write response: {}", e);
            }
        }

        Ok(())
    }
}

/// Load the artifact and serve until interrupted. A missing or corrupt
/// artifact refuses startup.
pub fn run_server(artifact_path: &Path, addr: &str) -> Result<()> {
    let artifact = ModelArtifact::load(artifact_path)
        .with_context(|| format!("refusing to start without a model ({})", artifact_path.display()))?;

    println!(
        "    {} Loaded model artifact: {} (trained {}, validation AUC {:.4})",
        style("✓").green().bold(),
        style(artifact_path.display()).dim(),
        artifact.created_at,
        artifact.metrics.validation_auc
    );

    ScoreService::new(artifact).run(addr)
}
