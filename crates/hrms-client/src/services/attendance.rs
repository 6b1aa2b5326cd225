//! `/attendance/*` endpoints.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::instrument;

use super::company::Company;
use super::format_date;
use crate::gateway::{ApiRequest, Gateway, GatewayError, MultipartPart};

#[derive(Clone)]
pub struct AttendanceService {
    gateway: Gateway,
}

impl AttendanceService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self))]
    pub async fn get_all_attendances<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        self.gateway
            .send_json(ApiRequest::get("/attendance/getAllAttendances"))
            .await
    }

    /// One employee's record for one day.
    #[instrument(skip(self))]
    pub async fn get_attendance_by_id<T: DeserializeOwned>(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::get("/attendance/getAttendanceById")
            .query("employeeId", employee_id)
            .query("date", format_date(date));
        self.gateway.send_json(request).await
    }

    #[instrument(skip(self))]
    pub async fn update_attendance<T: DeserializeOwned>(
        &self,
        employee_id: &str,
        date: NaiveDate,
        status: &str,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::put("/attendance/updateAttendance")
            .query("employeeId", employee_id)
            .json_value(json!({ "status": status, "date": format_date(date) }));
        self.gateway.send_json(request).await
    }

    #[instrument(skip(self, payload))]
    pub async fn mark_attendance<T: DeserializeOwned>(
        &self,
        payload: Value,
    ) -> Result<T, GatewayError> {
        self.gateway
            .send_json(ApiRequest::post("/attendance/markAttendance").json_value(payload))
            .await
    }

    /// Attendance history for an employee; `params` are passed through as
    /// extra query parameters (e.g. `month`, `year`).
    #[instrument(skip(self, params))]
    pub async fn get_employee_attendance<T: DeserializeOwned>(
        &self,
        employee_id: &str,
        params: &[(String, String)],
    ) -> Result<T, GatewayError> {
        let request = params.iter().fold(
            ApiRequest::get("/attendance/getEmployeeAttendance").query("employeeId", employee_id),
            |request, (key, value)| request.query(key.clone(), value),
        );
        self.gateway.send_json(request).await
    }

    /// Everyone's attendance on `date`, optionally restricted to one tenant.
    #[instrument(skip(self))]
    pub async fn get_daily_attendance<T: DeserializeOwned>(
        &self,
        date: NaiveDate,
        company: Option<Company>,
    ) -> Result<T, GatewayError> {
        let mut request =
            ApiRequest::get("/attendance/getDailyAttendance").query("date", format_date(date));
        if let Some(company) = company {
            request = request.query("company", company.as_str());
        }
        self.gateway.send_json(request).await
    }

    /// Import an attendance sheet.
    #[instrument(skip(self, sheet), fields(field = sheet.name()))]
    pub async fn upload_attendance_sheet<T: DeserializeOwned>(
        &self,
        sheet: MultipartPart,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::post("/attendance/uploadAttendanceSheet").multipart(vec![sheet]);
        self.gateway.send_json(request).await
    }

    /// Parse an attendance sheet without importing it.
    #[instrument(skip(self, sheet), fields(field = sheet.name()))]
    pub async fn preview_attendance_sheet<T: DeserializeOwned>(
        &self,
        sheet: MultipartPart,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::post("/attendance/previewAttendanceSheet").multipart(vec![sheet]);
        self.gateway.send_json(request).await
    }

    /// Whether records for `date` may still be edited.
    #[instrument(skip(self))]
    pub async fn can_modify_attendance<T: DeserializeOwned>(
        &self,
        date: NaiveDate,
    ) -> Result<T, GatewayError> {
        let request =
            ApiRequest::get("/attendance/canModifyAttendance").query("date", format_date(date));
        self.gateway.send_json(request).await
    }

    /// Older lookup kept for backends that predate `getEmployeeAttendance`.
    #[instrument(skip(self))]
    pub async fn get_attendance_by_employee_id<T: DeserializeOwned>(
        &self,
        employee_id: &str,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::get("/attendance/getAttendanceByEmployeeId")
            .query("employeeId", employee_id);
        self.gateway.send_json(request).await
    }
}
