use super::{LeaveRepository, RepositoryError, RepositoryResult};
use crate::model::leave_request::{LeaveQuery, LeaveRequest, LeaveStatus, LeaveType};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, employee_id, first_name, last_name, email, position, phone,
        manager_id, manager_name, manager_email,
        leave_type, leave_status, leave_start_date, leave_end_date,
        leave_reason, comments, duration_type, duration,
        medical_document, rejection_reason, created_at
    FROM leave_requests
"#;

/// Row shape of `leave_requests`; enums are stored as their wire names.
#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: String,
    first_name: String,
    last_name: String,
    email: String,
    position: String,
    phone: String,
    manager_id: String,
    manager_name: String,
    manager_email: String,
    leave_type: String,
    leave_status: String,
    leave_start_date: NaiveDate,
    leave_end_date: NaiveDate,
    leave_reason: Option<String>,
    comments: Option<String>,
    duration_type: Option<String>,
    duration: Option<f64>,
    medical_document: Option<String>,
    rejection_reason: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = RepositoryError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let leave_type = row.leave_type.parse::<LeaveType>().map_err(|_| {
            RepositoryError::Corrupt(format!(
                "id {} has unknown leave_type '{}'",
                row.id, row.leave_type
            ))
        })?;
        let leave_status = row.leave_status.parse::<LeaveStatus>().map_err(|_| {
            RepositoryError::Corrupt(format!(
                "id {} has unknown leave_status '{}'",
                row.id, row.leave_status
            ))
        })?;

        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            position: row.position,
            phone: row.phone,
            manager_id: row.manager_id,
            manager_name: row.manager_name,
            manager_email: row.manager_email,
            leave_type,
            leave_status,
            leave_start_date: row.leave_start_date,
            leave_end_date: row.leave_end_date,
            leave_reason: row.leave_reason,
            comments: row.comments,
            duration_type: row.duration_type,
            duration: row.duration,
            medical_document: row.medical_document,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
        })
    }
}

/// Builds the WHERE clause for a [`LeaveQuery`] along with its bind values.
fn where_clause(query: &LeaveQuery) -> (String, Vec<&str>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(employee_id) = query.employee_id.as_deref() {
        where_sql.push_str(" AND employee_id = ?");
        args.push(employee_id);
    }

    if let Some(manager_id) = query.manager_id.as_deref() {
        where_sql.push_str(" AND manager_id = ?");
        args.push(manager_id);
    }

    if let Some(status) = query.status.as_ref() {
        where_sql.push_str(" AND leave_status = ?");
        args.push(AsRef::<str>::as_ref(status));
    }

    (where_sql, args)
}

#[derive(Clone)]
pub struct MySqlLeaveRepository {
    pool: MySqlPool,
}

impl MySqlLeaveRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveRepository for MySqlLeaveRepository {
    async fn insert(&self, leave: &LeaveRequest) -> RepositoryResult<LeaveRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, first_name, last_name, email, position, phone,
                 manager_id, manager_name, manager_email,
                 leave_type, leave_status, leave_start_date, leave_end_date,
                 leave_reason, comments, duration_type, duration,
                 medical_document, rejection_reason)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&leave.employee_id)
        .bind(&leave.first_name)
        .bind(&leave.last_name)
        .bind(&leave.email)
        .bind(&leave.position)
        .bind(&leave.phone)
        .bind(&leave.manager_id)
        .bind(&leave.manager_name)
        .bind(&leave.manager_email)
        .bind(leave.leave_type.to_string())
        .bind(leave.leave_status.to_string())
        .bind(leave.leave_start_date)
        .bind(leave.leave_end_date)
        .bind(&leave.leave_reason)
        .bind(&leave.comments)
        .bind(&leave.duration_type)
        .bind(leave.duration)
        .bind(&leave.medical_document)
        .bind(&leave.rejection_reason)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find(id).await?.ok_or_else(|| {
            RepositoryError::Corrupt(format!("inserted leave request {} could not be read back", id))
        })
    }

    async fn find(&self, id: u64) -> RepositoryResult<Option<LeaveRequest>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);

        sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(LeaveRequest::try_from)
            .transpose()
    }

    async fn save(&self, leave: &LeaveRequest) -> RepositoryResult<Option<LeaveRequest>> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET employee_id = ?, first_name = ?, last_name = ?, email = ?,
                position = ?, phone = ?, manager_id = ?, manager_name = ?,
                manager_email = ?, leave_type = ?, leave_status = ?,
                leave_start_date = ?, leave_end_date = ?, leave_reason = ?,
                comments = ?, duration_type = ?, duration = ?,
                medical_document = ?, rejection_reason = ?
            WHERE id = ?
            "#,
        )
        .bind(&leave.employee_id)
        .bind(&leave.first_name)
        .bind(&leave.last_name)
        .bind(&leave.email)
        .bind(&leave.position)
        .bind(&leave.phone)
        .bind(&leave.manager_id)
        .bind(&leave.manager_name)
        .bind(&leave.manager_email)
        .bind(leave.leave_type.to_string())
        .bind(leave.leave_status.to_string())
        .bind(leave.leave_start_date)
        .bind(leave.leave_end_date)
        .bind(&leave.leave_reason)
        .bind(&leave.comments)
        .bind(&leave.duration_type)
        .bind(leave.duration)
        .bind(&leave.medical_document)
        .bind(&leave.rejection_reason)
        .bind(leave.id)
        .execute(&self.pool)
        .await?;

        // MySQL reports 0 affected rows when nothing changed, so re-read
        // instead of trusting rows_affected()
        if result.rows_affected() == 0 {
            tracing::debug!(leave_id = leave.id, "Update touched no rows");
        }
        self.find(leave.id).await
    }

    async fn delete(&self, id: u64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, query: &LeaveQuery) -> RepositoryResult<Vec<LeaveRequest>> {
        let (where_sql, args) = where_clause(query);
        let sql = format!("{}{} ORDER BY id ASC", SELECT_COLUMNS, where_sql);

        let mut data_q = sqlx::query_as::<_, LeaveRow>(&sql);
        for arg in args {
            data_q = data_q.bind(arg);
        }

        data_q
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(LeaveRequest::try_from)
            .collect()
    }
}
