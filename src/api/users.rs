use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::migration::backfill_entry;
use crate::model::{AttendanceEntry, EmployeeRecord, Role, Shaped, Slot, default_time_summary, summary_is_set};
use crate::store::Store;
use crate::utils::record_cache::RecordCache;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserFilter {
    /// Filter by dashboard role
    #[schema(example = "manager")]
    pub role: Option<Role>,
    /// Filter by department name (case-insensitive)
    #[schema(example = "Sales")]
    pub department: Option<String>,
}

impl UserFilter {
    fn matches(&self, record: &EmployeeRecord) -> bool {
        let role_ok = self.role.is_none_or(|role| record.typed_role() == Some(role));
        let department_ok = match &self.department {
            None => true,
            Some(wanted) => record
                .department_name()
                .is_some_and(|d| d.eq_ignore_ascii_case(wanted.trim())),
        };
        role_ok && department_ok
    }
}

async fn load_records(
    store: &web::Data<dyn Store>,
    cache: &web::Data<RecordCache>,
) -> actix_web::Result<Arc<Vec<EmployeeRecord>>> {
    cache.load(store.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load users data");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "message": "User not found"
    }))
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilter),
    responses(
        (status = 200, description = "Employee records as stored", body = Object, example = json!([{
            "id": 1,
            "name": "Somchai",
            "role": "manager",
            "department": "Sales",
            "attendanceRecords": [],
            "timeSummary": { "totalWorkDays": 250 }
        }])),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn list_users(
    store: web::Data<dyn Store>,
    cache: web::Data<RecordCache>,
    query: web::Query<UserFilter>,
) -> actix_web::Result<impl Responder> {
    let records = load_records(&store, &cache).await?;
    let filtered: Vec<&EmployeeRecord> = records.iter().filter(|r| query.matches(r)).collect();
    Ok(HttpResponse::Ok().json(filtered))
}

/// Get one employee
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id", Path, description = "Employee id, numeric or text")),
    responses(
        (status = 200, description = "Employee record", body = Object),
        (status = 404, description = "No employee with this id", body = Object, example = json!({
            "message": "User not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn get_user(
    store: web::Data<dyn Store>,
    cache: web::Data<RecordCache>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let records = load_records(&store, &cache).await?;
    let id = path.into_inner();

    Ok(match find(&records, &id) {
        Some(record) => HttpResponse::Ok().json(record),
        None => not_found(),
    })
}

/// Attendance entries of one employee
///
/// Check events without an address or distance are shown with the same
/// defaults the migration writes, so an unmigrated store renders the same.
#[utoipa::path(
    get,
    path = "/api/users/{id}/attendance",
    params(("id", Path, description = "Employee id, numeric or text")),
    responses(
        (status = 200, description = "Attendance entries", body = Object, example = json!([{
            "date": "2024-03-01",
            "checkIn": { "time": "08:02", "status": "on-time", "address": "ในพื้นที่อนุญาต", "distance": "-" }
        }])),
        (status = 404, description = "No employee with this id"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn get_attendance(
    store: web::Data<dyn Store>,
    cache: web::Data<RecordCache>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let records = load_records(&store, &cache).await?;
    let id = path.into_inner();

    let Some(record) = find(&records, &id) else {
        return Ok(not_found());
    };
    let entries: Vec<Shaped<AttendanceEntry>> = record
        .attendance()
        .iter()
        .map(|entry| entry.map_typed(backfill_entry))
        .collect();
    Ok(HttpResponse::Ok().json(entries))
}

/// Time summary of one employee
#[utoipa::path(
    get,
    path = "/api/users/{id}/summary",
    params(("id", Path, description = "Employee id, numeric or text")),
    responses(
        (status = 200, description = "Stored summary, or the default one", body = Object, example = json!({
            "totalWorkDays": 250,
            "onTime": 240,
            "late": 8,
            "absent": 2,
            "leave": 0,
            "totalHours": "2,000 ชม.",
            "avgCheckIn": "08:00",
            "avgCheckOut": "17:30"
        })),
        (status = 404, description = "No employee with this id"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn get_summary(
    store: web::Data<dyn Store>,
    cache: web::Data<RecordCache>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let records = load_records(&store, &cache).await?;
    let id = path.into_inner();

    let Some(record) = find(&records, &id) else {
        return Ok(not_found());
    };
    Ok(match &record.time_summary {
        Slot::Present(summary) if summary_is_set(summary) => HttpResponse::Ok().json(summary),
        _ => HttpResponse::Ok().json(default_time_summary()),
    })
}

fn find<'a>(records: &'a [EmployeeRecord], id: &str) -> Option<&'a EmployeeRecord> {
    records.iter().find(|r| r.id_text().as_deref() == Some(id))
}
