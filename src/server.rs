//! # HTTP Server for Fiscal Printing
//!
//! Provides a small JSON API in front of one [`Fiscal`] client, for point
//! of sale systems that talk to the printer over the network.
//!
//! ## Usage
//!
//! ```bash
//! tfhka serve --listen 0.0.0.0:5000 --driver ./tfinulx --workdir .
//! ```
//!
//! ## Endpoints
//!
//! | Route | Method | Action |
//! |-------|--------|--------|
//! | `/test` | GET | connection test (prints the printer configuration) |
//! | `/status` | GET | status/error codes with descriptions |
//! | `/invoice` | POST | build and print a fiscal invoice |
//! | `/report` | POST | print an X or Z report |
//!
//! The driver protocol is strictly serial — the result files are a shared
//! mailbox — so the one client sits behind a mutex and requests take turns.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::error::TfhkaError;
use crate::invoice::Invoice;
use crate::printer::{DriverConfig, Fiscal, ReportKind};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:5000")
    pub listen_addr: String,
    /// Driver profile for the client the server owns
    pub driver: DriverConfig,
}

type SharedPrinter = Arc<Mutex<Fiscal>>;

/// Body of `POST /report`.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    /// "X" or "Z"
    pub kind: String,
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use tfhka::printer::DriverConfig;
/// use tfhka::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), tfhka::TfhkaError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:5000".to_string(),
///     driver: DriverConfig::default(),
/// };
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), TfhkaError> {
    let printer: SharedPrinter = Arc::new(Mutex::new(Fiscal::new(config.driver.clone())));

    let app = Router::new()
        .route("/test", get(test_handler))
        .route("/status", get(status_handler))
        .route("/invoice", post(invoice_handler))
        .route("/report", post(report_handler))
        .with_state(printer);

    println!("Fiscal print server starting...");
    println!("Listening on: {}", config.listen_addr);
    println!("Driver: {}", config.driver.driver_path.display());
    println!("Working directory: {}", config.driver.work_dir.display());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run a blocking printer operation against the shared client.
async fn with_printer<T, F>(printer: SharedPrinter, op: F) -> Result<Result<T, TfhkaError>, String>
where
    T: Send + 'static,
    F: FnOnce(&mut Fiscal) -> Result<T, TfhkaError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        // A poisoned lock only means a previous request panicked mid-print;
        // the session state is still usable.
        let mut client = printer.lock().unwrap_or_else(|e| e.into_inner());
        op(&mut client)
    })
    .await
    .map_err(|e| format!("Task error: {}", e))
}

/// Handle GET /test - send the configuration-print command as a probe.
async fn test_handler(State(printer): State<SharedPrinter>) -> Response {
    match with_printer(printer, |client| client.send_cmd("D")).await {
        Ok(Ok(reply)) if reply.is_ack() => Json(json!({
            "message": "Fiscal connection test passed.",
            "reply": reply.to_string(),
        }))
        .into_response(),
        Ok(Ok(reply)) => error_response(
            StatusCode::BAD_GATEWAY,
            &format!("Printer rejected the test command ({})", reply),
        ),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

/// Handle GET /status - current status/error codes with descriptions.
async fn status_handler(State(printer): State<SharedPrinter>) -> Response {
    match with_printer(printer, |client| client.read_status_codes()).await {
        Ok(Ok(report)) => Json(json!({
            "status_code": report.status,
            "status": report.status_text(),
            "error_code": report.error,
            "error": report.error_text(),
        }))
        .into_response(),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

/// Handle POST /invoice - build the command file and print it.
async fn invoice_handler(
    State(printer): State<SharedPrinter>,
    Json(invoice): Json<Invoice>,
) -> Response {
    if invoice.items.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Invoice has no items");
    }

    match with_printer(printer, move |client| client.send_invoice(&invoice)).await {
        Ok(Ok(reply)) => Json(json!({
            "message": "Invoice printed.",
            "reply": reply,
        }))
        .into_response(),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

/// Handle POST /report - print an X or Z report.
async fn report_handler(
    State(printer): State<SharedPrinter>,
    Json(request): Json<ReportRequest>,
) -> Response {
    let kind: ReportKind = match request.kind.parse() {
        Ok(kind) => kind,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    match with_printer(printer, move |client| client.print_report(kind)).await {
        Ok(Ok(reply)) if reply.is_ack() => Json(json!({
            "message": format!("Report '{}' printed.", kind),
            "reply": reply.to_string(),
        }))
        .into_response(),
        Ok(Ok(reply)) => error_response(
            StatusCode::BAD_GATEWAY,
            &format!("Printer rejected the report command ({})", reply),
        ),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

/// Generate a JSON error response.
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
