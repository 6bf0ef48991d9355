//! Account entities, one collection per role.
//!
//! Accounts never share a table: the credential's role decides which
//! collection an id is resolved against. Password hashes are stored but
//! never serialized into responses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::approval::ApprovalRecord;

/// Back-office administrator.
#[derive(Debug, Clone, Serialize)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Shopper account.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub phone_no: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: String, email: String, password_hash: String, phone_no: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            phone_no,
            address: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Merchant account. Starts in the pending approval state.
#[derive(Debug, Clone, Serialize)]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    pub shop_name: String,
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub phone_no: String,
    pub address: String,

    #[serde(flatten)]
    pub approval: ApprovalRecord,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Seller {
    pub fn new(
        name: String,
        shop_name: String,
        email: String,
        password_hash: String,
        phone_no: String,
        address: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            shop_name,
            email,
            password_hash,
            phone_no,
            address,
            approval: ApprovalRecord::pending(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Courier account. Starts in the pending approval state.
#[derive(Debug, Clone, Serialize)]
pub struct Deliverer {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub phone_no: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_no: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(flatten)]
    pub approval: ApprovalRecord,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deliverer {
    pub fn new(name: String, email: String, password_hash: String, phone_no: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            phone_no,
            vehicle_no: None,
            vehicle_type: None,
            address: None,
            approval: ApprovalRecord::pending(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::ApprovalStatus;

    #[test]
    fn test_new_seller_starts_pending() {
        let seller = Seller::new(
            "Ann".into(),
            "Ann's Shop".into(),
            "ann@example.com".into(),
            "hash".into(),
            "1234567890".into(),
            "1 Main St".into(),
        );
        assert_eq!(seller.approval.status, ApprovalStatus::Pending);
        assert!(seller.is_active);
    }

    #[test]
    fn test_new_deliverer_starts_pending() {
        let deliverer = Deliverer::new(
            "Dan".into(),
            "dan@example.com".into(),
            "hash".into(),
            "1234567890".into(),
        );
        assert_eq!(deliverer.approval.status, ApprovalStatus::Pending);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let admin = Admin::new("Root".into(), "root@example.com".into(), "secret-hash".into());
        let json = serde_json::to_string(&admin).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_seller_serializes_approval_inline() {
        let seller = Seller::new(
            "Ann".into(),
            "Ann's Shop".into(),
            "ann@example.com".into(),
            "hash".into(),
            "1234567890".into(),
            "1 Main St".into(),
        );
        let json = serde_json::to_value(&seller).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json.get("approved_by").is_none());
    }
}
