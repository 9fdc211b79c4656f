use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{ApiResponse, Envelope};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::customer::{CreateCustomerRequest, CustomerResponse, UpdateCustomerRequest};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/customers",
    tag = "Customers",
    operation_id = "listCustomers",
    summary = "List customers",
    description = "Returns every customer with their images, ordered by last name then first name.",
    responses(
        (status = 200, description = "All customers", body = Envelope<Vec<CustomerResponse>>),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CustomerResponse>>>, AppError> {
    let customers = state.customers().list_customers().await?;

    Ok(Json(ApiResponse::success(
        customers.into_iter().map(CustomerResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "Customers",
    operation_id = "getCustomer",
    summary = "Get a customer",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer with images", body = Envelope<CustomerResponse>),
        (status = 404, description = "Customer not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(customer_id = id))]
pub async fn get_customer(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let details = state.customers().get_customer(id).await?;

    Ok(Json(ApiResponse::success(details.into())))
}

#[utoipa::path(
    post,
    path = "/customers",
    tag = "Customers",
    operation_id = "createCustomer",
    summary = "Create a customer",
    description = "Creates a customer, optionally with up to 10 images. Embedded images \
        with a blank payload are skipped; any payload that is not valid base64 aborts \
        the whole creation.",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = Envelope<CustomerResponse>),
        (status = 400, description = "Validation failure, malformed image or too many images", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_customer(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerResponse>>), AppError> {
    let (fields, images) = payload.into_parts()?;
    let details = state.customers().create_customer(fields, images).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            details.into(),
            "Customer created successfully.",
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "Customers",
    operation_id = "updateCustomer",
    summary = "Update a customer",
    description = "Overwrites the customer's fields. A non-empty `images` list replaces \
        every stored image; omitting it or sending an empty list keeps them.",
    params(("id" = i32, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = Envelope<CustomerResponse>),
        (status = 400, description = "Validation failure or malformed image", body = ErrorBody),
        (status = 404, description = "Customer not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(customer_id = id))]
pub async fn update_customer(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let (fields, images) = payload.into_parts()?;
    let details = state.customers().update_customer(id, fields, images).await?;

    Ok(Json(ApiResponse::with_message(
        details.into(),
        "Customer updated successfully.",
    )))
}

#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "Customers",
    operation_id = "deleteCustomer",
    summary = "Delete a customer",
    description = "Deletes the customer and every image it owns.",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deleted", body = Envelope<bool>),
        (status = 404, description = "Customer not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(customer_id = id))]
pub async fn delete_customer(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    state.customers().delete_customer(id).await?;

    Ok(Json(ApiResponse::with_message(
        true,
        "Customer deleted successfully.",
    )))
}
