//! Typed wrappers over the backend resource endpoints.
//!
//! Response payloads are product data, so every call is generic over the
//! caller's type; `serde_json::Value` works when no schema is wanted.

mod attendance;
mod company;
mod employee;

pub use attendance::AttendanceService;
pub use company::Company;
pub use employee::{EmployeePayload, EmployeeService};

use chrono::NaiveDate;

/// Date format the backend uses in query strings and bodies.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
