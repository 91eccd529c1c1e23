//! Accounts, the company guard, and paid-feature entitlement.
//!
//! Authentication itself lives elsewhere; this module only consumes the
//! identity it produces through the [`AccountDirectory`] port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

pub const LOGIN_PATH: &str = "/login";
pub const COMPANY_SIGNUP_PATH: &str = "/signup/company";
/// Where an unentitled user is sent to unlock paid features.
pub const UPGRADE_REDIRECT: &str = "/login?redirect=/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Hr,
    Employee,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Pending,
    Active,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub company_id: Option<String>,
    #[serde(default)]
    pub status: AccountStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The directory could not be reached at all.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Company signup rejected: {0}")]
    Signup(String),
}

/// Read access to the signed-in user and their company.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn current_user(&self) -> Result<Option<Identity>, AccessError>;

    async fn company_for_user(
        &self,
        email: &str,
    ) -> Result<Option<CompanyRecord>, AccessError>;

    /// Creates a company for the signed-in user and links them as its owner.
    async fn complete_company_signup(
        &self,
        company_name: &str,
    ) -> Result<CompanyRecord, AccessError>;
}

/// Outcome of the company guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed(Identity),
    RedirectToLogin,
    RedirectToCompanySignup,
}

impl AccessDecision {
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::Allowed(_) => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToCompanySignup => Some(COMPANY_SIGNUP_PATH),
        }
    }
}

/// Lets a user through only when they are signed in and belong to a company.
///
/// A user without a company id on their identity is looked up in the
/// directory before being sent to company signup. Any directory failure
/// sends the user to the login page.
pub async fn check_company_access(directory: &dyn AccountDirectory) -> AccessDecision {
    let user = match directory.current_user().await {
        Ok(Some(user)) => user,
        Ok(None) => return AccessDecision::RedirectToLogin,
        Err(error) => {
            warn!(%error, "company guard could not load the current user");
            return AccessDecision::RedirectToLogin;
        }
    };

    if user.company_id.is_some() {
        return AccessDecision::Allowed(user);
    }

    match directory.company_for_user(&user.email).await {
        Ok(Some(company)) => {
            debug!(user = %user.email, company = %company.id, "found company by user email");
            AccessDecision::Allowed(user)
        }
        Ok(None) => AccessDecision::RedirectToCompanySignup,
        Err(error @ AccessError::Unavailable(_)) => {
            warn!(%error, user = %user.email, "company guard lookup failed");
            AccessDecision::RedirectToLogin
        }
        Err(error) => {
            debug!(%error, user = %user.email, "company lookup rejected, treating user as companyless");
            AccessDecision::RedirectToCompanySignup
        }
    }
}

/// Whether paid branding (logo, signature, brand colour) is unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entitlement {
    Entitled,
    Denied { redirect: &'static str },
}

impl Entitlement {
    pub const DENIED: Entitlement = Entitlement::Denied {
        redirect: UPGRADE_REDIRECT,
    };

    /// Any signed-in user is entitled.
    pub fn for_identity(identity: Option<&Identity>) -> Self {
        match identity {
            Some(_) => Self::Entitled,
            None => Self::DENIED,
        }
    }

    pub fn from_flag(entitled: bool) -> Self {
        if entitled { Self::Entitled } else { Self::DENIED }
    }

    pub fn is_entitled(&self) -> bool {
        matches!(self, Self::Entitled)
    }
}

/// Directory backed by fixed records, for offline use and tests.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    user: Mutex<Option<Identity>>,
    companies: Mutex<Vec<(String, CompanyRecord)>>,
}

impl StaticDirectory {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user: Identity) -> Self {
        Self {
            user: Mutex::new(Some(user)),
            companies: Mutex::new(Vec::new()),
        }
    }

    /// Registers `company` as belonging to the user with `email`.
    pub async fn add_company(
        &self,
        email: &str,
        company: CompanyRecord,
    ) {
        self.companies.lock().await.push((email.to_string(), company));
    }
}

#[async_trait]
impl AccountDirectory for StaticDirectory {
    async fn current_user(&self) -> Result<Option<Identity>, AccessError> {
        Ok(self.user.lock().await.clone())
    }

    async fn company_for_user(
        &self,
        email: &str,
    ) -> Result<Option<CompanyRecord>, AccessError> {
        Ok(self
            .companies
            .lock()
            .await
            .iter()
            .find(|(owner, _)| owner.eq_ignore_ascii_case(email))
            .map(|(_, company)| company.clone()))
    }

    async fn complete_company_signup(
        &self,
        company_name: &str,
    ) -> Result<CompanyRecord, AccessError> {
        let name = company_name.trim();
        if name.is_empty() {
            return Err(AccessError::Signup("company name is required".to_string()));
        }

        let mut user = self.user.lock().await;
        let Some(identity) = user.as_mut() else {
            return Err(AccessError::Authentication("not signed in".to_string()));
        };

        let company = CompanyRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            plan: Plan::Free,
            active: false,
        };
        identity.company_id = Some(company.id.clone());
        identity.role = Role::Owner;
        self.companies
            .lock()
            .await
            .push((identity.email.clone(), company.clone()));
        Ok(company)
    }
}
