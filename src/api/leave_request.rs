use crate::error::LeaveError;
use crate::model::leave_request::{LeaveRequest, LeaveRequestData, LeaveStatus, LeaveType};
use crate::service::leave_request::LeaveService;
use crate::storage::DocumentUpload;
use actix_multipart::form::{MultipartForm, bytes::Bytes as FormBytes, text::Text};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

/// Multipart body of `POST /leave/submit`.
#[derive(MultipartForm)]
pub struct SubmitLeaveForm {
    #[multipart(rename = "employeeId")]
    pub employee_id: Text<String>,
    #[multipart(rename = "firstName")]
    pub first_name: Text<String>,
    #[multipart(rename = "lastName")]
    pub last_name: Text<String>,
    pub email: Text<String>,
    pub position: Text<String>,
    pub phone: Text<String>,
    #[multipart(rename = "managerId")]
    pub manager_id: Text<String>,
    #[multipart(rename = "managerName")]
    pub manager_name: Text<String>,
    #[multipart(rename = "managerEmail")]
    pub manager_email: Text<String>,
    pub comments: Option<Text<String>>,
    #[multipart(rename = "durationType")]
    pub duration_type: Option<Text<String>>,
    pub duration: Option<Text<f64>>,
    #[multipart(rename = "leaveStartDate")]
    pub leave_start_date: Text<NaiveDate>,
    #[multipart(rename = "leaveEndDate")]
    pub leave_end_date: Text<NaiveDate>,
    #[multipart(rename = "leaveReason")]
    pub leave_reason: Option<Text<String>>,
    #[multipart(rename = "leaveStatus")]
    pub leave_status: Option<Text<LeaveStatus>>,
    #[multipart(rename = "leaveType")]
    pub leave_type: Option<Text<LeaveType>>,
    #[multipart(rename = "medicalDocument")]
    pub medical_document: Option<FormBytes>,
}

impl SubmitLeaveForm {
    fn into_parts(self) -> (LeaveRequestData, Option<DocumentUpload>) {
        let data = LeaveRequestData {
            employee_id: self.employee_id.into_inner(),
            first_name: self.first_name.into_inner(),
            last_name: self.last_name.into_inner(),
            email: self.email.into_inner(),
            position: self.position.into_inner(),
            phone: self.phone.into_inner(),
            manager_id: self.manager_id.into_inner(),
            manager_name: self.manager_name.into_inner(),
            manager_email: self.manager_email.into_inner(),
            leave_type: self.leave_type.map(Text::into_inner),
            leave_status: self.leave_status.map(Text::into_inner),
            leave_start_date: Some(self.leave_start_date.into_inner()),
            leave_end_date: Some(self.leave_end_date.into_inner()),
            leave_reason: self.leave_reason.map(Text::into_inner),
            comments: self.comments.map(Text::into_inner),
            duration_type: self.duration_type.map(Text::into_inner),
            duration: self.duration.map(Text::into_inner),
            medical_document: None,
            rejection_reason: None,
        };

        let document = self.medical_document.map(|file| DocumentUpload {
            file_name: file.file_name,
            content_type: file.content_type.map(|mime| mime.to_string()),
            data: file.data.to_vec(),
        });

        (data, document)
    }
}

/// Swagger shape of the multipart submission
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLeaveDoc {
    #[schema(example = "EMP-001")]
    employee_id: String,
    first_name: String,
    last_name: String,
    email: String,
    position: String,
    phone: String,
    #[schema(example = "MGR-01")]
    manager_id: String,
    manager_name: String,
    manager_email: String,
    comments: Option<String>,
    duration_type: Option<String>,
    duration: Option<f64>,
    #[schema(example = "2024-03-04", format = "date", value_type = String)]
    leave_start_date: String,
    #[schema(example = "2024-03-08", format = "date", value_type = String)]
    leave_end_date: String,
    leave_reason: Option<String>,
    leave_status: Option<LeaveStatus>,
    leave_type: Option<LeaveType>,
    /// Required to be kept only for sick leave longer than two business days
    #[schema(value_type = Option<String>, format = Binary)]
    medical_document: Option<Vec<u8>>,
}

#[derive(Deserialize, IntoParams)]
pub struct FileSizeQuery {
    /// Blob name of an uploaded document
    #[serde(rename = "fileName")]
    #[param(example = "medicalDocument-1f0c-note.pdf")]
    pub file_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct FileSizeResponse {
    #[schema(example = 0)]
    pub size: u64,
}

/// Lists answered through this policy report an empty result as 404.
fn list_or_not_found(leaves: Vec<LeaveRequest>) -> HttpResponse {
    if leaves.is_empty() {
        HttpResponse::NotFound().json(leaves)
    } else {
        HttpResponse::Ok().json(leaves)
    }
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/leave/submit",
    request_body(
        content = SubmitLeaveDoc,
        description = "Leave request form, optionally with a medical document",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Missing or invalid field"),
        (status = 502, description = "Medical document upload failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    service: web::Data<LeaveService>,
    MultipartForm(form): MultipartForm<SubmitLeaveForm>,
) -> Result<HttpResponse, LeaveError> {
    let (data, document) = form.into_parts();
    debug!(
        employee_id = %data.employee_id,
        has_document = document.is_some(),
        "Leave submission received"
    );

    let saved = service.submit(data, document).await?;
    Ok(HttpResponse::Ok().json(saved))
}

/* =========================
Approve leave
========================= */
#[utoipa::path(
    put,
    path = "/leave/approve/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "message": "Leave Request Approved"
        })),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already rejected")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    service.approve(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave Request Approved"
    })))
}

/* =========================
Reject leave
========================= */
#[utoipa::path(
    put,
    path = "/leave/reject/{id}/{leaveReason}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to reject"),
        ("leaveReason" = String, Path, description = "Why the request is rejected")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave Request Rejected with Reason: flu"
        })),
        (status = 400, description = "Blank reason"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already approved")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    service: web::Data<LeaveService>,
    path: web::Path<(u64, String)>,
) -> Result<HttpResponse, LeaveError> {
    let (id, reason) = path.into_inner();
    let rejected = service.reject(id, &reason).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!(
            "Leave Request Rejected with Reason: {}",
            rejected.rejection_reason.unwrap_or(reason)
        )
    })))
}

/* =========================
Update leave
========================= */
#[utoipa::path(
    put,
    path = "/leave/update/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to update")
    ),
    request_body = LeaveRequestData,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequest),
        (status = 400, description = "Missing or invalid field"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Status change not allowed")
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<LeaveRequestData>,
) -> Result<HttpResponse, LeaveError> {
    let updated = service
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/* =========================
Delete leave
========================= */
#[utoipa::path(
    delete,
    path = "/leave/delete/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 200, description = "Leave request deleted", body = Object, example = json!({
            "message": "Leave request 1 deleted successfully"
        })),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    let message = service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/leave/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found with id: 1"
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    let leave = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    get,
    path = "/leave",
    responses(
        (status = 200, description = "All leave requests", body = [LeaveRequest]),
        (status = 404, description = "No leave requests")
    ),
    tag = "Leave"
)]
pub async fn leave_list(service: web::Data<LeaveService>) -> Result<HttpResponse, LeaveError> {
    Ok(list_or_not_found(service.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/leave/{status}/manager/{managerId}",
    params(
        ("status" = String, Path, description = "pending, approved or rejected"),
        ("managerId" = String, Path, description = "Manager identifier")
    ),
    responses(
        (status = 200, description = "Matching leave requests", body = [LeaveRequest]),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "No matching leave requests")
    ),
    tag = "Leave"
)]
pub async fn leave_by_manager_and_status(
    service: web::Data<LeaveService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, LeaveError> {
    let (status, manager_id) = path.into_inner();

    let Ok(status) = status.to_uppercase().parse::<LeaveStatus>() else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("Unknown leave status '{}'. Allowed: pending, approved, rejected", status)
        })));
    };

    Ok(list_or_not_found(
        service.list_by_manager_and_status(&manager_id, status).await?,
    ))
}

async fn employee_leaves_with_status(
    service: &LeaveService,
    employee_id: &str,
    status: LeaveStatus,
) -> Result<HttpResponse, LeaveError> {
    Ok(list_or_not_found(
        service.list_for_employee(employee_id, status).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/leave/pending/employee/{employeeId}",
    params(("employeeId" = String, Path, description = "Employee identifier")),
    responses(
        (status = 200, description = "Pending leave requests", body = [LeaveRequest]),
        (status = 404, description = "No pending leave requests")
    ),
    tag = "Leave"
)]
pub async fn pending_for_employee(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    employee_leaves_with_status(&service, &path.into_inner(), LeaveStatus::Pending).await
}

#[utoipa::path(
    get,
    path = "/leave/approve/employee/{employeeId}",
    params(("employeeId" = String, Path, description = "Employee identifier")),
    responses(
        (status = 200, description = "Approved leave requests", body = [LeaveRequest]),
        (status = 404, description = "No approved leave requests")
    ),
    tag = "Leave"
)]
pub async fn approved_for_employee(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    employee_leaves_with_status(&service, &path.into_inner(), LeaveStatus::Approved).await
}

#[utoipa::path(
    get,
    path = "/leave/reject/employee/{employeeId}",
    params(("employeeId" = String, Path, description = "Employee identifier")),
    responses(
        (status = 200, description = "Rejected leave requests", body = [LeaveRequest]),
        (status = 404, description = "No rejected leave requests")
    ),
    tag = "Leave"
)]
pub async fn rejected_for_employee(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    employee_leaves_with_status(&service, &path.into_inner(), LeaveStatus::Rejected).await
}

#[utoipa::path(
    get,
    path = "/leave/manager/{managerId}",
    params(("managerId" = String, Path, description = "Manager identifier")),
    responses(
        (status = 200, description = "Leave requests for the manager", body = [LeaveRequest]),
        (status = 404, description = "No leave requests for the manager")
    ),
    tag = "Leave"
)]
pub async fn leave_by_manager(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    Ok(list_or_not_found(
        service.list_by_manager(&path.into_inner()).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/leave/employee/{employeeId}",
    params(("employeeId" = String, Path, description = "Employee identifier")),
    responses(
        (status = 200, description = "Leave requests of the employee, possibly empty", body = [LeaveRequest])
    ),
    tag = "Leave"
)]
pub async fn leave_by_employee(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    let leaves = service.list_by_employee(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Placeholder kept for clients of the old upload flow; blob sizes are not
/// tracked.
#[utoipa::path(
    get,
    path = "/leave/fileSize",
    params(FileSizeQuery),
    responses(
        (status = 200, description = "Always zero", body = FileSizeResponse)
    ),
    tag = "Leave"
)]
pub async fn file_size(query: web::Query<FileSizeQuery>) -> impl Responder {
    debug!(file_name = %query.file_name, "File size requested");
    HttpResponse::Ok().json(FileSizeResponse { size: 0 })
}
