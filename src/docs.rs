use crate::api::leave_request::{FileSizeResponse, SubmitLeaveDoc};
use crate::model::leave_request::{LeaveRequest, LeaveRequestData, LeaveStatus, LeaveType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Approval API",
        version = "1.0.0",
        description = r#"
## Leave Approval Service

Backend for employee leave requests and their manager approval workflow.

### 🔹 Key Features
- **Submission**
  - Apply for leave with an optional medical document
  - Sick leave longer than two business days keeps its document in blob storage
- **Approval**
  - Approve or reject pending requests, with a reason for rejections
- **Queries**
  - Leave lists per employee, per manager and per status

### 📦 Response Format
- JSON bodies with camelCase fields
- Dates as `YYYY-MM-DD`, enums in upper case (`SICK`, `PENDING`, ...)
- Errors as `{ "message": "..." }`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::submit_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::leave_by_manager_and_status,
        crate::api::leave_request::pending_for_employee,
        crate::api::leave_request::approved_for_employee,
        crate::api::leave_request::rejected_for_employee,
        crate::api::leave_request::leave_by_manager,
        crate::api::leave_request::leave_by_employee,
        crate::api::leave_request::file_size
    ),
    components(
        schemas(
            LeaveRequest,
            LeaveRequestData,
            LeaveType,
            LeaveStatus,
            SubmitLeaveDoc,
            FileSizeResponse
        )
    ),
    tags(
        (name = "Leave", description = "Leave management APIs"),
    )
)]
pub struct ApiDoc;
