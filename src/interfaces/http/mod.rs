use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::error::AppError;
use crate::domain::query::{HealthStatus, QueryMetadata, QueryResult, ERROR_KIND};
use crate::infrastructure::bootstrap::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

#[derive(Debug, Deserialize, Validate)]
pub struct ProcessQueryRequest {
    #[validate(length(min = 1, max = 1000))]
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteSqlRequest {
    pub sql: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

/// Error envelope for the diagnostic endpoint; same keys as a failed `QueryResult`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    #[serde(rename = "type")]
    kind: &'static str,
    error: String,
    formatted: String,
}

impl ErrorBody {
    fn new(code: &str, formatted: &str) -> Self {
        Self {
            success: false,
            kind: ERROR_KIND,
            error: code.to_string(),
            formatted: formatted.to_string(),
        }
    }

    fn from_error(err: &AppError) -> Self {
        Self::new(err.code(), err.user_message())
    }
}

/// HTTP status for an operator error code; `None` means success.
pub fn status_for_code(code: Option<&str>) -> StatusCode {
    match code {
        None => StatusCode::OK,
        Some("VALIDATION_ERROR") | Some("UNSAFE_QUERY") => StatusCode::BAD_REQUEST,
        Some("CONNECTION_ERROR") | Some("STATEMENT_TIMEOUT") => StatusCode::SERVICE_UNAVAILABLE,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn validation_failure(message: String, session_id: Option<String>) -> QueryResult {
    let err = AppError::ValidationError(message);
    QueryResult::failure(
        &err,
        QueryMetadata {
            sql_query: None,
            execution_time: 0,
            row_count: 0,
            session_id,
            query_id: Uuid::new_v4().to_string(),
            confidence: 0.0,
            template_used: None,
        },
    )
}

#[post("/process-query")]
async fn process_query(
    data: web::Data<AppState>,
    req: web::Json<ProcessQueryRequest>,
) -> impl Responder {
    let req = req.into_inner();
    if let Err(errors) = req.validate() {
        warn!(errors = %errors, "Rejected query request");
        let result = validation_failure(errors.to_string(), req.session_id);
        return HttpResponse::BadRequest().json(result);
    }
    if req.query.trim().is_empty() {
        let result = validation_failure("query is blank".to_string(), req.session_id);
        return HttpResponse::BadRequest().json(result);
    }

    let result = data
        .query_service
        .process_natural_query(&req.query, req.session_id)
        .await;
    HttpResponse::build(status_for_code(result.error.as_deref())).json(result)
}

#[post("/execute-sql")]
async fn execute_sql(
    data: web::Data<AppState>,
    http: HttpRequest,
    req: web::Json<ExecuteSqlRequest>,
) -> impl Responder {
    let Some(expected) = data.admin_token.as_deref() else {
        return HttpResponse::Forbidden()
            .json(ErrorBody::new("FORBIDDEN", "נקודת הקצה אינה זמינה."));
    };
    let supplied = http
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    if supplied != Some(expected) {
        warn!(target: "security", "Rejected diagnostic SQL call with a bad admin token");
        return HttpResponse::Unauthorized()
            .json(ErrorBody::new("UNAUTHORIZED", "אין הרשאה לבצע פעולה זו."));
    }

    info!("Executing diagnostic SQL");
    match data.query_service.execute_raw_sql(&req.sql, &req.params).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => {
            HttpResponse::build(status_for_code(Some(err.code()))).json(ErrorBody::from_error(&err))
        }
    }
}

#[get("/health")]
async fn health(data: web::Data<AppState>) -> impl Responder {
    let report = data.query_service.health_check().await;
    let status = if report.status == HealthStatus::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    HttpResponse::build(status).json(report)
}

fn api_scope() -> actix_web::Scope {
    web::scope("/api")
        .service(process_query)
        .service(execute_sql)
        .service(health)
}

pub fn start_server(state: AppState, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .service(api_scope())
    })
    .bind((host, port))?
    .run();

    info!(host = %host, port, "HTTP server listening");
    Ok(server)
}
