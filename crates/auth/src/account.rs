//! Application-level account records resolved from the data store.
//!
//! These are read-only snapshots of backend rows. The resolver replaces
//! them wholesale on every fetch; nothing in the portal mutates them in
//! place.

use heliconnect_core::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Portal user profile, keyed by identity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    /// Authorization-relevant role
    pub role: Role,
    pub company_name: Option<String>,
    pub company_type: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub billing_address: Option<BillingAddress>,
    pub preferred_language: String,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Charter-operator company record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub legal_name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<CompanyAddress>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub operating_license: Option<String>,
    pub insurance_number: Option<String>,
    pub insurance_expiry: Option<String>,
    /// Platform commission on bookings, as a percentage
    pub commission_rate: f64,
    pub is_active: bool,
    pub is_verified: bool,
    pub contract_signed_at: Option<String>,
    pub contract_url: Option<String>,
    pub bank_details: Option<BankDetails>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankDetails {
    pub iban: String,
    pub bic: String,
    pub bank_name: String,
    pub account_holder: String,
}

/// Role of a profile inside its company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyRole {
    Owner,
    Admin,
    Member,
}

/// Join record linking a profile to its company.
///
/// Presence implies company-scoped authorization; at most one active
/// membership per profile in this portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMembership {
    pub id: String,
    pub company_id: String,
    pub user_id: String,
    pub role: CompanyRole,
    #[serde(default)]
    pub permissions: HashMap<String, bool>,
    pub created_at: String,
}
