//! Enrollment status and persisted status history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const STATUS_PREFIX: &str = "STUDENT_ENROLLMENT_STATUS_";

/// Student enrollment status at one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    #[serde(rename = "STUDENT_ENROLLMENT_STATUS_POTENTIAL")]
    Potential,
    #[serde(rename = "STUDENT_ENROLLMENT_STATUS_ENROLLED")]
    Enrolled,
    #[serde(rename = "STUDENT_ENROLLMENT_STATUS_WITHDRAWN")]
    Withdrawn,
    #[serde(rename = "STUDENT_ENROLLMENT_STATUS_GRADUATED")]
    Graduated,
    #[serde(rename = "STUDENT_ENROLLMENT_STATUS_LOA")]
    Loa,
    #[serde(rename = "STUDENT_ENROLLMENT_STATUS_TEMPORARY")]
    Temporary,
    #[serde(rename = "STUDENT_ENROLLMENT_STATUS_NON_POTENTIAL")]
    NonPotential,
}

impl EnrollmentStatus {
    pub const ALL: [EnrollmentStatus; 7] = [
        EnrollmentStatus::Potential,
        EnrollmentStatus::Enrolled,
        EnrollmentStatus::Withdrawn,
        EnrollmentStatus::Graduated,
        EnrollmentStatus::Loa,
        EnrollmentStatus::Temporary,
        EnrollmentStatus::NonPotential,
    ];

    /// Storage name, e.g. `STUDENT_ENROLLMENT_STATUS_ENROLLED`
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Potential => "STUDENT_ENROLLMENT_STATUS_POTENTIAL",
            EnrollmentStatus::Enrolled => "STUDENT_ENROLLMENT_STATUS_ENROLLED",
            EnrollmentStatus::Withdrawn => "STUDENT_ENROLLMENT_STATUS_WITHDRAWN",
            EnrollmentStatus::Graduated => "STUDENT_ENROLLMENT_STATUS_GRADUATED",
            EnrollmentStatus::Loa => "STUDENT_ENROLLMENT_STATUS_LOA",
            EnrollmentStatus::Temporary => "STUDENT_ENROLLMENT_STATUS_TEMPORARY",
            EnrollmentStatus::NonPotential => "STUDENT_ENROLLMENT_STATUS_NON_POTENTIAL",
        }
    }

    /// Parse the long (`STUDENT_ENROLLMENT_STATUS_ENROLLED`) or short
    /// (`ENROLLED`) form, case-insensitively
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        let short = upper.strip_prefix(STATUS_PREFIX).unwrap_or(&upper);
        match short {
            "POTENTIAL" => Some(EnrollmentStatus::Potential),
            "ENROLLED" => Some(EnrollmentStatus::Enrolled),
            "WITHDRAWN" => Some(EnrollmentStatus::Withdrawn),
            "GRADUATED" => Some(EnrollmentStatus::Graduated),
            "LOA" => Some(EnrollmentStatus::Loa),
            "TEMPORARY" => Some(EnrollmentStatus::Temporary),
            "NON_POTENTIAL" => Some(EnrollmentStatus::NonPotential),
            _ => None,
        }
    }

    /// Every status except Temporary counts as activated
    pub fn is_activated(&self) -> bool {
        !matches!(self, EnrollmentStatus::Temporary)
    }

    /// Statuses driven by the order/ERP system
    ///
    /// Also the allow list of statuses accepted from the order flow.
    pub fn is_erp_status(&self) -> bool {
        matches!(
            self,
            EnrollmentStatus::Potential
                | EnrollmentStatus::Temporary
                | EnrollmentStatus::NonPotential
        )
    }

    /// Statuses that cannot start in the future
    pub fn requires_current_start(&self) -> bool {
        matches!(
            self,
            EnrollmentStatus::Temporary | EnrollmentStatus::NonPotential
        )
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a student's enrollment status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentStatusHistory {
    pub student_id: String,
    /// Location system ID
    pub location_id: String,
    pub status: EnrollmentStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub order_id: Option<String>,
}

impl EnrollmentStatusHistory {
    /// Entry is in effect at `at`
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && self.end_date.map_or(true, |end| end >= at)
    }
}
