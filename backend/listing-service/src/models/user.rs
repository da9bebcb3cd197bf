use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Buyer,
    Seller,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Buyer => "Buyer",
            AccountType::Seller => "Seller",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buyer" => Ok(AccountType::Buyer),
            "Seller" => Ok(AccountType::Seller),
            other => Err(format!("unknown account type: {}", other)),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovtIdType {
    Aadhar,
    #[serde(rename = "PAN")]
    Pan,
    Passport,
}

impl GovtIdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GovtIdType::Aadhar => "Aadhar",
            GovtIdType::Pan => "PAN",
            GovtIdType::Passport => "Passport",
        }
    }
}

impl FromStr for GovtIdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Aadhar" => Ok(GovtIdType::Aadhar),
            "PAN" => Ok(GovtIdType::Pan),
            "Passport" => Ok(GovtIdType::Passport),
            other => Err(format!("unknown government id type: {}", other)),
        }
    }
}

/// Marketplace account. The password hash never leaves the service.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub contact: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub account_type: AccountType,
    pub govt_id_type: GovtIdType,
    pub govt_id_number: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// `GET /api/users/me` body.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "savedListings")]
    pub saved_listings: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "All required fields must be filled."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub contact: Option<String>,
    #[serde(default)]
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters."))]
    pub password: String,
    #[validate(required(message = "All required fields must be filled."))]
    pub account_type: Option<AccountType>,
    #[validate(required(message = "All required fields must be filled."))]
    pub govt_id_type: Option<GovtIdType>,
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "All required fields must be filled."))]
    pub govt_id_number: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Invalid credentials"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Invalid credentials"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub username: String,
    pub account_type: AccountType,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedListingsResponse {
    #[serde(rename = "savedListings")]
    pub saved_listings: Vec<Uuid>,
}
