//! Approval lifecycle for seller and deliverer accounts.
//!
//! Accounts that sell or deliver start in `pending` and become usable only
//! after an admin approves them. Rejection is not terminal: a rejected
//! account can be approved later, and an approved account can be rejected.
//! All transitions go through [`ApprovalRecord::approve`] and
//! [`ApprovalRecord::reject`]; generic profile updates never touch the
//! approval fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{BazaarError, Result};

/// Where an account stands in the approval workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status together with its audit stamps.
///
/// `approved_by` and `approved_at` record the most recent approval and are
/// written in the same transition that sets the status. A later rejection
/// leaves them in place as history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub status: ApprovalStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

impl ApprovalRecord {
    /// Fresh record for a newly registered account.
    pub fn pending() -> Self {
        Self::default()
    }

    /// Record that predates the approval workflow and is grandfathered in.
    pub fn legacy_approved() -> Self {
        Self {
            status: ApprovalStatus::Approved,
            approved_by: None,
            approved_at: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }

    /// Transition to `approved`, stamping the acting admin and the time.
    ///
    /// `entity` names the account kind in the error message, e.g. "Seller".
    pub fn approve(&mut self, admin_id: Uuid, entity: &str) -> Result<()> {
        if self.status == ApprovalStatus::Approved {
            return Err(BazaarError::conflict(format!(
                "{} is already approved",
                entity
            )));
        }
        self.status = ApprovalStatus::Approved;
        self.approved_by = Some(admin_id);
        self.approved_at = Some(Utc::now());
        Ok(())
    }

    /// Transition to `rejected`. Existing approval stamps are kept as history.
    pub fn reject(&mut self, entity: &str) -> Result<()> {
        if self.status == ApprovalStatus::Rejected {
            return Err(BazaarError::conflict(format!(
                "{} is already rejected",
                entity
            )));
        }
        self.status = ApprovalStatus::Rejected;
        Ok(())
    }
}
