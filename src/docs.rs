use crate::api::migrate::MigrateQuery;
use crate::api::users::UserFilter;
use crate::model::Role;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance Store API",
        version = "1.0.0",
        description = r#"
## HRM attendance store

Serves the employee roster of the HR dashboard (identity, role, department,
daily clock-in/out entries and time summaries) after upgrading it to the
current record shape.

### 🔹 Key Features
- **Bootstrap migration**
  - Fills `address` / `distance` on old clock-in/out events
  - Adds a default time summary to records stored without one
  - Idempotent, additive-only, unknown fields preserved
- **Read API**
  - List employees by role / department, view attendance and summaries

### 📦 Response Format
- JSON; records are returned with the dashboard's own camelCase keys
"#,
    ),
    paths(
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::get_attendance,
        crate::api::users::get_summary,

        crate::api::migrate::trigger_migration
    ),
    components(
        schemas(
            Role,
            UserFilter,
            MigrateQuery
        )
    ),
    tags(
        (name = "Users", description = "Employee roster read APIs"),
        (name = "Migration", description = "Users data migration"),
    )
)]
pub struct ApiDoc;
