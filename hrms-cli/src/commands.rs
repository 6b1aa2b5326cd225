use std::path::Path;
use std::sync::Arc;

use hrms_client::{
    AttendanceService, AuthService, ClientConfig, EmployeePayload, EmployeeService,
    FileCredentialStore, Gateway, MultipartPart, Session,
};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    cli::{AttendanceAction, EmployeeAction},
    error::{CliError, Result},
    output::OutputManager,
};

pub struct CommandExecutor {
    auth: AuthService,
    employees: EmployeeService,
    attendance: AttendanceService,
    output: OutputManager,
}

impl CommandExecutor {
    /// Open the persisted session and build the services on top of it.
    pub async fn new(
        client_config: ClientConfig,
        session_path: &Path,
        output: OutputManager,
    ) -> Result<Self> {
        let store = Arc::new(FileCredentialStore::new(session_path));
        let session = Arc::new(Session::new(store));
        let restored = session.restore().await.map_err(hrms_client::Error::from)?;
        debug!(restored, path = %session_path.display(), "Session loaded");

        session.on_session_ended(|reason| warn!(%reason, "Stored session cleared"));

        let gateway = Gateway::new(client_config, session);
        Ok(Self {
            auth: AuthService::new(gateway.clone()),
            employees: EmployeeService::new(gateway.clone()),
            attendance: AttendanceService::new(gateway),
            output,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let outcome = self.auth.login(email, password).await?;
        let name = outcome
            .user
            .as_ref()
            .and_then(|user| user.get("name").or_else(|| user.get("email")))
            .and_then(Value::as_str)
            .unwrap_or(email)
            .to_string();
        self.output.print_success(&format!("Logged in as {name}"))
    }

    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await;
        self.output.print_success("Logged out")
    }

    pub fn whoami(&self) -> Result<()> {
        let user = self.auth.current_user().ok_or(CliError::NotLoggedIn)?;
        self.output.print_value(&user)
    }

    pub fn status(&self) -> Result<()> {
        let credential = self.auth.gateway().session().current_credential();
        let status = json!({
            "apiUrl": self.auth.gateway().config().base_url.as_str(),
            "authenticated": self.auth.is_authenticated(),
            "tokenValid": self.auth.is_token_valid(),
            "expiresAt": credential.as_ref().and_then(|c| c.expires_at).map(|t| t.to_rfc3339()),
            "canRefresh": credential.as_ref().is_some_and(|c| c.has_refresh_token()),
        });
        self.output.print_value(&status)
    }

    pub async fn employees(&self, action: EmployeeAction) -> Result<()> {
        self.require_session()?;
        let employees = &self.employees;

        let value: Value = match action {
            EmployeeAction::List { company: None } => employees.get_all_employees().await?,
            EmployeeAction::List {
                company: Some(company),
            } => employees.get_company_employees(company).await?,
            EmployeeAction::Get { id } => employees.get_employee_by_id(&id).await?,
            EmployeeAction::Create { data } => {
                let body = read_json_arg(&data)?;
                employees
                    .create_employee(EmployeePayload::Json(body))
                    .await?
            }
            EmployeeAction::Update { id, data } => {
                let body = read_json_arg(&data)?;
                employees.update_employee(&id, body).await?
            }
            EmployeeAction::ProfilePic { id, file } => {
                let picture = MultipartPart::from_path("profilePic", &file).await?;
                employees.update_profile_pic(&id, picture).await?
            }
            EmployeeAction::ToggleActive { id } => employees.toggle_active(&id).await?,
            EmployeeAction::Delete { id } => employees.delete_employee(&id).await?,
        };

        self.output.print_value(&value)
    }

    pub async fn attendance(&self, action: AttendanceAction) -> Result<()> {
        self.require_session()?;
        let attendance = &self.attendance;

        let value: Value = match action {
            AttendanceAction::All => attendance.get_all_attendances().await?,
            AttendanceAction::Daily { date, company } => {
                attendance.get_daily_attendance(date, company).await?
            }
            AttendanceAction::Employee { id, params } => {
                attendance.get_employee_attendance(&id, &params).await?
            }
            AttendanceAction::Get { id, date } => attendance.get_attendance_by_id(&id, date).await?,
            AttendanceAction::Mark { data } => {
                let body = read_json_arg(&data)?;
                attendance.mark_attendance(body).await?
            }
            AttendanceAction::Update { id, date, status } => {
                attendance.update_attendance(&id, date, &status).await?
            }
            AttendanceAction::Upload { file } => {
                let sheet = MultipartPart::from_path("file", &file).await?;
                attendance.upload_attendance_sheet(sheet).await?
            }
            AttendanceAction::Preview { file } => {
                let sheet = MultipartPart::from_path("file", &file).await?;
                attendance.preview_attendance_sheet(sheet).await?
            }
            AttendanceAction::CanModify { date } => attendance.can_modify_attendance(date).await?,
        };

        self.output.print_value(&value)
    }

    /// Fail fast when there is nothing to authenticate with.
    fn require_session(&self) -> Result<()> {
        if self.auth.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotLoggedIn)
        }
    }
}

/// Parse a `--data` argument: inline JSON, or `@path` to read a file.
fn read_json_arg(raw: &str) -> Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => raw.to_string(),
    };
    let value: Value = serde_json::from_str(&text)?;
    if !value.is_object() {
        return Err(CliError::InvalidInput(
            "--data must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}
