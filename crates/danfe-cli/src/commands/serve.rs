//! Serve command - upload a DANFE over HTTP and download the spreadsheet.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Args;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use danfe_core::{convert_pdf, format_localized_amount, DanfeConfig, DanfeError, ExtractionError};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for generated spreadsheets (overrides config)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

/// State shared across handlers.
#[derive(Clone)]
pub struct ServerState {
    config: Arc<DanfeConfig>,
}

impl ServerState {
    pub fn new(config: DanfeConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn output_dir(&self) -> &std::path::Path {
        &self.config.server.output_dir
    }
}

/// Response of `POST /processar`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ProcessResponse {
    Success {
        sucesso: bool,
        arquivo: String,
        mensagem: String,
        nfe: String,
        emissao: String,
        valor: String,
    },
    Failure {
        sucesso: bool,
        erro: String,
    },
}

impl ProcessResponse {
    fn failure(message: impl Into<String>) -> Json<Self> {
        Json(ProcessResponse::Failure {
            sucesso: false,
            erro: message.into(),
        })
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(output_dir) = args.output_dir {
        config.server.output_dir = output_dir;
    }

    tokio::fs::create_dir_all(&config.server.output_dir).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        "Starting server on {}, writing spreadsheets to {}",
        addr,
        config.server.output_dir.display()
    );

    let app = build_router(ServerState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router with all endpoints.
pub fn build_router(state: ServerState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/processar", post(process_upload))
        .route("/download/{name}", get(download))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn process_upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Json<ProcessResponse> {
    let (file_name, data) = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("pdf") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => break (file_name, bytes),
                    Err(e) => return ProcessResponse::failure(e.to_string()),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => return ProcessResponse::failure("Nenhum arquivo enviado."),
            Err(e) => return ProcessResponse::failure(e.to_string()),
        }
    };

    if !file_name.to_lowercase().ends_with(".pdf") {
        return ProcessResponse::failure("Apenas PDFs são aceitos.");
    }

    let base_name = Uuid::new_v4().to_string();
    let output_name = format!("{}.xlsx", base_name);
    let output_path = state.output_dir().join(&output_name);
    info!("Converting upload {} as {}", file_name, output_name);

    let config = state.config.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let conversion = convert_pdf(&data, &config)?;
        conversion.report.save(&output_path)?;
        Ok::<_, DanfeError>(conversion)
    })
    .await;

    let conversion = match outcome {
        Ok(Ok(conversion)) => conversion,
        Ok(Err(DanfeError::Extraction(ExtractionError::NoItems))) => {
            warn!("No items found in upload {}", file_name);
            return ProcessResponse::failure(
                "Nenhum item encontrado. Verifique se é um DANFE válido.",
            );
        }
        Ok(Err(e)) => {
            warn!("Failed to convert upload {}: {}", file_name, e);
            return ProcessResponse::failure(e.to_string());
        }
        Err(e) => {
            error!("Conversion task failed: {}", e);
            return ProcessResponse::failure(e.to_string());
        }
    };

    let header = &conversion.extraction.invoice.header;
    Json(ProcessResponse::Success {
        sucesso: true,
        arquivo: output_name,
        mensagem: format!("{} itens extraídos com sucesso!", conversion.item_count()),
        nfe: header.invoice_number.clone(),
        emissao: header.issue_date.clone(),
        valor: format!("R$ {}", format_localized_amount(conversion.total_net, 2)),
    })
}

/// Whether `name` is a bare `.xlsx` file name.
fn is_valid_download_name(name: &str) -> bool {
    name.ends_with(".xlsx") && !name.contains('/') && !name.contains('\\')
}

async fn download(State(state): State<ServerState>, Path(name): Path<String>) -> Response {
    if !is_valid_download_name(&name) {
        return (StatusCode::BAD_REQUEST, "Arquivo inválido.").into_response();
    }

    let path = state.output_dir().join(&name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, XLSX_MIME.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"NFe_{}\"", name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Arquivo não encontrado ou expirado.").into_response()
        }
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "danfe-test-boundary";

    fn state(dir: &TempDir) -> ServerState {
        let mut config = DanfeConfig::default();
        config.server.output_dir = dir.path().to_path_buf();
        ServerState::new(config)
    }

    fn multipart_request(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/processar")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_download_name_validation() {
        assert!(is_valid_download_name("0b5d.xlsx"));
        assert!(!is_valid_download_name("0b5d.pdf"));
        assert!(!is_valid_download_name("../etc/passwd.xlsx"));
        assert!(!is_valid_download_name("..\\secret.xlsx"));
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let response = build_router(state(&dir))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_process_rejects_non_pdf() {
        let dir = TempDir::new().unwrap();
        let response = build_router(state(&dir))
            .oneshot(multipart_request("pdf", "nota.txt", b"hello"))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["sucesso"], false);
        assert_eq!(body["erro"], "Apenas PDFs são aceitos.");
    }

    #[tokio::test]
    async fn test_process_without_pdf_field() {
        let dir = TempDir::new().unwrap();
        let response = build_router(state(&dir))
            .oneshot(multipart_request("file", "nota.pdf", b"%PDF"))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["sucesso"], false);
        assert_eq!(body["erro"], "Nenhum arquivo enviado.");
    }

    #[tokio::test]
    async fn test_process_converts_pdf() {
        let dir = TempDir::new().unwrap();
        let pdf = danfe_core::pdf::fixture::sample_danfe_pdf().unwrap();
        let response = build_router(state(&dir))
            .oneshot(multipart_request("pdf", "nota.pdf", &pdf))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["sucesso"], true);
        assert_eq!(body["mensagem"], "1 itens extraídos com sucesso!");
        assert_eq!(body["nfe"], "000.045.210");
        assert_eq!(body["emissao"], "17/02/2026");
        assert_eq!(body["valor"], "R$ 2.163,86");

        let name = body["arquivo"].as_str().unwrap();
        assert!(is_valid_download_name(name));
        let written = std::fs::read(dir.path().join(name)).unwrap();
        assert!(written.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_process_reports_unreadable_pdf() {
        let dir = TempDir::new().unwrap();
        let response = build_router(state(&dir))
            .oneshot(multipart_request("pdf", "nota.PDF", b"not really a pdf"))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["sucesso"], false);
        assert!(body["erro"].as_str().unwrap().contains("PDF"));
    }

    #[tokio::test]
    async fn test_download_missing_and_invalid() {
        let dir = TempDir::new().unwrap();
        let app = build_router(state(&dir));

        let missing = app
            .clone()
            .oneshot(Request::get("/download/nope.xlsx").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid = app
            .oneshot(Request::get("/download/nope.pdf").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_serves_attachment() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("abc.xlsx"), b"PK\x03\x04").unwrap();

        let response = build_router(state(&dir))
            .oneshot(Request::get("/download/abc.xlsx").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"NFe_abc.xlsx\""
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_MIME);
    }
}
