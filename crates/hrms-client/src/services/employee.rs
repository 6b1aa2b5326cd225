//! `/employee/*` endpoints.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use super::company::Company;
use crate::gateway::{ApiRequest, Gateway, GatewayError, MultipartPart};

/// Body for creating an employee.
#[derive(Debug, Clone)]
pub enum EmployeePayload {
    Json(Value),
    /// Form fields plus files (e.g. a profile picture).
    Multipart(Vec<MultipartPart>),
}

#[derive(Clone)]
pub struct EmployeeService {
    gateway: Gateway,
}

impl EmployeeService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self, payload))]
    pub async fn create_employee<T: DeserializeOwned>(
        &self,
        payload: EmployeePayload,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::post("/employee/createEmployee");
        let request = match payload {
            EmployeePayload::Json(body) => request.json_value(body),
            EmployeePayload::Multipart(parts) => request.multipart(parts),
        };
        self.gateway.send_json(request).await
    }

    #[instrument(skip(self))]
    pub async fn get_all_employees<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        self.gateway
            .send_json(ApiRequest::get("/employee/getAllEmployees"))
            .await
    }

    /// Employees of one tenant.
    #[instrument(skip(self))]
    pub async fn get_company_employees<T: DeserializeOwned>(
        &self,
        company: Company,
    ) -> Result<T, GatewayError> {
        self.gateway
            .send_json(ApiRequest::get(company.employees_path()))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_employee_by_id<T: DeserializeOwned>(
        &self,
        id: &str,
    ) -> Result<T, GatewayError> {
        self.gateway
            .send_json(ApiRequest::get("/employee/getEmployeeById").query("id", id))
            .await
    }

    #[instrument(skip(self, data))]
    pub async fn update_employee<T: DeserializeOwned>(
        &self,
        id: &str,
        data: Value,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::put("/employee/updateEmployee")
            .query("id", id)
            .json_value(data);
        self.gateway.send_json(request).await
    }

    /// Replace the profile picture; `file` is sent as the `profilePic` field.
    #[instrument(skip(self, file))]
    pub async fn update_profile_pic<T: DeserializeOwned>(
        &self,
        id: &str,
        file: MultipartPart,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::put("/employee/updateProfilePic")
            .query("id", id)
            .multipart(vec![file]);
        self.gateway.send_json(request).await
    }

    /// Flip the employee between active and inactive.
    #[instrument(skip(self))]
    pub async fn toggle_active<T: DeserializeOwned>(&self, id: &str) -> Result<T, GatewayError> {
        self.gateway
            .send_json(ApiRequest::put("/employee/isActiveToggle").query("id", id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_employee<T: DeserializeOwned>(&self, id: &str) -> Result<T, GatewayError> {
        self.gateway
            .send_json(ApiRequest::delete("/employee/deleteEmployee").query("id", id))
            .await
    }
}
