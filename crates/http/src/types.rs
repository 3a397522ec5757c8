//! Wire types exchanged with the fundraiser backend

use chrono::NaiveDate;
use fundraiser_core::UserProfile;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Token refresh request
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Token refresh response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Username/password login request
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Tokens plus user, returned by login and OTP verification
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserProfile,
}

/// Request an emailed one-time password
#[derive(Debug, Serialize, Deserialize)]
pub struct OtpRequest {
    pub email: String,
}

/// Exchange an emailed one-time password for tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Account registration request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Backend view of the current authentication state
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Birthday fundraising campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    pub full_name: String,
    pub title: String,
    pub description: String,
    pub birthday_date: NaiveDate,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub donors_count: u32,
    pub status: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub donations: Vec<CampaignDonation>,
}

/// Completed donation as listed on a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDonation {
    pub donor_name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub message: String,
    pub date: String,
}

/// Donation submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationRequest {
    pub donor_name: String,
    pub donor_email: String,
    #[serde(default)]
    pub donor_phone: String,
    pub amount: Decimal,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Raw donation response; `success` is the only reliable field
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DonationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub donation_id: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Accepted donation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationReceipt {
    pub donation_id: Option<u64>,
    /// Payment page to continue at, when the backend started a payment
    pub payment_url: Option<String>,
}
