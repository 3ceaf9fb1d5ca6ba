use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    Sick,
    Vacation,
    Personal,
    Maternity,
    Paternity,
    Bereavement,
    Unpaid,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A status change that the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: LeaveStatus,
    pub to: LeaveStatus,
}

impl LeaveStatus {
    /// Validates a move from `self` to `target`.
    ///
    /// PENDING may move anywhere. APPROVED and REJECTED only accept
    /// themselves again (re-approving, or re-rejecting with a new reason).
    pub fn try_transition(self, target: LeaveStatus) -> Result<LeaveStatus, InvalidTransition> {
        match (self, target) {
            (LeaveStatus::Pending, _) => Ok(target),
            (from, to) if from == to => Ok(to),
            (from, to) => Err(InvalidTransition { from, to }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "employeeId": "EMP-001",
    "firstName": "John",
    "lastName": "Doe",
    "email": "john.doe@company.com",
    "position": "Engineer",
    "phone": "+8801712345678",
    "managerId": "MGR-01",
    "managerName": "Jane Roe",
    "managerEmail": "jane.roe@company.com",
    "leaveType": "SICK",
    "leaveStatus": "PENDING",
    "leaveStartDate": "2024-03-04",
    "leaveEndDate": "2024-03-08",
    "leaveReason": "flu",
    "comments": null,
    "durationType": null,
    "duration": null,
    "medicalDocument": "https://account.blob.core.windows.net/docs/medicalDocument-1f0c-note.pdf",
    "rejectionReason": null,
    "createdAt": "2024-03-01T09:00:00Z"
}))]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub phone: String,
    pub manager_id: String,
    pub manager_name: String,
    pub manager_email: String,
    pub leave_type: LeaveType,
    pub leave_status: LeaveStatus,
    #[schema(example = "2024-03-04", format = "date", value_type = String)]
    pub leave_start_date: NaiveDate,
    #[schema(example = "2024-03-08", format = "date", value_type = String)]
    pub leave_end_date: NaiveDate,
    pub leave_reason: Option<String>,
    pub comments: Option<String>,
    pub duration_type: Option<String>,
    pub duration: Option<f64>,
    /// URL of the uploaded medical document, if one was required and supplied
    pub medical_document: Option<String>,
    /// Set only when the request is rejected
    pub rejection_reason: Option<String>,
    #[schema(example = "2024-03-01T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Every mutable field of a leave request. Used for submission and for
/// full-record updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestData {
    pub employee_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub manager_id: String,
    #[serde(default)]
    pub manager_name: String,
    #[serde(default)]
    pub manager_email: String,
    pub leave_type: Option<LeaveType>,
    pub leave_status: Option<LeaveStatus>,
    #[schema(example = "2024-03-04", format = "date", value_type = Option<String>)]
    pub leave_start_date: Option<NaiveDate>,
    #[schema(example = "2024-03-08", format = "date", value_type = Option<String>)]
    pub leave_end_date: Option<NaiveDate>,
    pub leave_reason: Option<String>,
    pub comments: Option<String>,
    pub duration_type: Option<String>,
    pub duration: Option<f64>,
    pub medical_document: Option<String>,
    pub rejection_reason: Option<String>,
}

/// Predicate for store queries; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveQuery {
    pub employee_id: Option<String>,
    pub manager_id: Option<String>,
    pub status: Option<LeaveStatus>,
}

impl LeaveQuery {
    pub fn matches(&self, leave: &LeaveRequest) -> bool {
        self.employee_id
            .as_deref()
            .is_none_or(|id| leave.employee_id == id)
            && self
                .manager_id
                .as_deref()
                .is_none_or(|id| leave.manager_id == id)
            && self.status.is_none_or(|s| leave.leave_status == s)
    }
}
