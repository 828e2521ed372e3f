//! HTTP wrapper over the compensation operations.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use payroll_db::SqliteStore;
use payroll_http::error::AppError;
use payroll_http::extract::{AppJson, AppPath, AppQuery};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::adjuster::SalaryAdjuster;
use super::bonus::BonusCalculator;
use super::directory::list_employees;
use super::error::CompensationError;
use super::models::{BonusLine, Employee, OperationOutcome, OutcomeKind};

#[derive(Clone)]
struct CompensationState {
    store: SqliteStore,
}

#[derive(Debug, Deserialize)]
pub struct AdjustSalaryRequest {
    pub percentage_increase: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    pub rating: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BonusResponse {
    pub employee_id: i64,
    pub rating: i64,
    pub bonus: Decimal,
}

pub(super) fn router(store: SqliteStore) -> Router {
    Router::new()
        .route("/employees", get(employees))
        .route(
            "/employees/{employee_id}/salary-adjustments",
            post(adjust_salary),
        )
        .route("/employees/{employee_id}/bonus", get(employee_bonus))
        .route("/bonuses", get(bonus_report))
        .with_state(CompensationState { store })
}

/// Outcomes map onto statuses; the body is always the outcome itself so
/// clients can show its message verbatim.
fn outcome_status(kind: OutcomeKind) -> StatusCode {
    match kind {
        OutcomeKind::Success => StatusCode::OK,
        OutcomeKind::NotFound => StatusCode::NOT_FOUND,
        OutcomeKind::WouldBeNegative => StatusCode::UNPROCESSABLE_ENTITY,
        OutcomeKind::UnknownFailure => StatusCode::CONFLICT,
    }
}

/// Run synchronous store work on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CompensationError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| AppError::Internal(err.into()))?
        .map_err(AppError::from)
}

async fn employees(State(state): State<CompensationState>) -> Result<Json<Vec<Employee>>, AppError> {
    let store = state.store;
    let employees = blocking(move || Ok(list_employees(&store)?)).await?;
    Ok(Json(employees))
}

async fn adjust_salary(
    State(state): State<CompensationState>,
    AppPath(employee_id): AppPath<i64>,
    AppJson(request): AppJson<AdjustSalaryRequest>,
) -> Result<(StatusCode, Json<OperationOutcome>), AppError> {
    let store = state.store;
    let outcome = blocking(move || {
        SalaryAdjuster::new(store).apply(employee_id, request.percentage_increase)
    })
    .await?;

    Ok((outcome_status(outcome.kind()), Json(outcome)))
}

async fn employee_bonus(
    State(state): State<CompensationState>,
    AppPath(employee_id): AppPath<i64>,
    AppQuery(query): AppQuery<RatingQuery>,
) -> Result<Json<BonusResponse>, AppError> {
    let store = state.store;
    let rating = query.rating;
    let bonus = blocking(move || Ok(BonusCalculator::new(store).compute(employee_id, rating)?)).await?;

    Ok(Json(BonusResponse {
        employee_id,
        rating,
        bonus,
    }))
}

async fn bonus_report(
    State(state): State<CompensationState>,
    AppQuery(query): AppQuery<RatingQuery>,
) -> Result<Json<Vec<BonusLine>>, AppError> {
    let store = state.store;
    let report = blocking(move || Ok(BonusCalculator::new(store).report(query.rating)?)).await?;
    Ok(Json(report))
}

pub(super) fn openapi() -> serde_json::Value {
    let error_response = |description: &str| {
        json!({
            "description": description,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        })
    };
    let outcome_response = |description: &str| {
        json!({
            "description": description,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/OperationOutcome" } } }
        })
    };
    let employee_id_param = json!({
        "name": "employee_id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    });
    let rating_param = json!({
        "name": "rating",
        "in": "query",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    });

    json!({
        "paths": {
            "/employees": {
                "get": {
                    "summary": "List employees with their departments",
                    "tags": ["Compensation"],
                    "responses": {
                        "200": {
                            "description": "Employee directory",
                            "content": { "application/json": { "schema": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Employee" }
                            } } }
                        },
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/employees/{employee_id}/salary-adjustments": {
                "post": {
                    "summary": "Adjust an employee's salary by a percentage",
                    "tags": ["Compensation"],
                    "parameters": [employee_id_param.clone()],
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": {
                            "$ref": "#/components/schemas/AdjustSalaryRequest"
                        } } }
                    },
                    "responses": {
                        "200": outcome_response("Salary updated"),
                        "404": outcome_response("Employee not found"),
                        "400": error_response("Malformed employee id or request body"),
                        "409": outcome_response("Update did not affect exactly one row; retry the adjustment"),
                        "422": outcome_response("New salary would be negative, or the percentage is out of range"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/employees/{employee_id}/bonus": {
                "get": {
                    "summary": "Bonus for one employee at a performance rating",
                    "tags": ["Compensation"],
                    "parameters": [employee_id_param, rating_param.clone()],
                    "responses": {
                        "200": {
                            "description": "Bonus amount; 0.00 for unknown employees or untiered ratings",
                            "content": { "application/json": { "schema": {
                                "$ref": "#/components/schemas/BonusResponse"
                            } } }
                        },
                        "400": error_response("Malformed employee id or rating"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/bonuses": {
                "get": {
                    "summary": "Bonus report across all employees at one rating",
                    "tags": ["Compensation"],
                    "parameters": [rating_param],
                    "responses": {
                        "200": {
                            "description": "One line per employee",
                            "content": { "application/json": { "schema": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/BonusLine" }
                            } } }
                        },
                        "400": error_response("Missing or malformed rating"),
                        "500": error_response("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Employee": {
                    "type": "object",
                    "properties": {
                        "employee_id": { "type": "integer", "format": "int64" },
                        "first_name": { "type": "string" },
                        "last_name": { "type": "string" },
                        "salary": { "type": "string", "description": "Decimal with two fractional digits" },
                        "department_id": { "type": "integer", "format": "int64", "nullable": true },
                        "department_name": { "type": "string", "nullable": true }
                    },
                    "required": ["employee_id", "first_name", "last_name", "salary"]
                },
                "AdjustSalaryRequest": {
                    "type": "object",
                    "properties": {
                        "percentage_increase": {
                            "type": "string",
                            "description": "Percentage change; negative values cut the salary"
                        }
                    },
                    "required": ["percentage_increase"]
                },
                "OperationOutcome": {
                    "type": "object",
                    "properties": {
                        "kind": {
                            "type": "string",
                            "enum": ["not_found", "would_be_negative", "success", "unknown_failure"]
                        },
                        "employee_id": { "type": "integer", "format": "int64" },
                        "message": { "type": "string" },
                        "new_salary": { "type": "string", "nullable": true }
                    },
                    "required": ["kind", "employee_id", "message"]
                },
                "BonusResponse": {
                    "type": "object",
                    "properties": {
                        "employee_id": { "type": "integer", "format": "int64" },
                        "rating": { "type": "integer", "format": "int64" },
                        "bonus": { "type": "string" }
                    },
                    "required": ["employee_id", "rating", "bonus"]
                },
                "BonusLine": {
                    "type": "object",
                    "properties": {
                        "employee_id": { "type": "integer", "format": "int64" },
                        "first_name": { "type": "string" },
                        "last_name": { "type": "string" },
                        "salary": { "type": "string" },
                        "rating": { "type": "integer", "format": "int64" },
                        "bonus": { "type": "string" }
                    },
                    "required": ["employee_id", "first_name", "last_name", "salary", "rating", "bonus"]
                }
            }
        }
    })
}
