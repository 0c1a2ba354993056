//! Reference entities resolved by partner-internal ID

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub grade_id: String,
    pub partner_internal_id: String,
    pub name: String,
}

/// Tag type; keeps parent tags off student records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagType {
    Student,
    StudentDiscount,
    Parent,
    ParentDiscount,
}

impl TagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagType::Student => "USER_TAG_TYPE_STUDENT",
            TagType::StudentDiscount => "USER_TAG_TYPE_STUDENT_DISCOUNT",
            TagType::Parent => "USER_TAG_TYPE_PARENT",
            TagType::ParentDiscount => "USER_TAG_TYPE_PARENT_DISCOUNT",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "USER_TAG_TYPE_STUDENT" => Some(TagType::Student),
            "USER_TAG_TYPE_STUDENT_DISCOUNT" => Some(TagType::StudentDiscount),
            "USER_TAG_TYPE_PARENT" => Some(TagType::Parent),
            "USER_TAG_TYPE_PARENT_DISCOUNT" => Some(TagType::ParentDiscount),
            _ => None,
        }
    }

    /// Tag types that may be attached to a student
    pub fn is_student_tag(&self) -> bool {
        matches!(self, TagType::Student | TagType::StudentDiscount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: String,
    pub partner_internal_id: String,
    pub name: String,
    pub tag_type: TagType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub school_id: String,
    pub partner_internal_id: String,
    pub name: String,
    pub school_level_id: String,
    pub is_archived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolCourse {
    pub school_course_id: String,
    pub partner_internal_id: String,
    /// Owning school (system ID)
    pub school_id: String,
    pub name: String,
    pub is_archived: bool,
}

/// Lowest-level location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: String,
    pub partner_internal_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefecture {
    pub prefecture_id: String,
    pub prefecture_code: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Parent,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Parent => "parent",
            UserRole::Staff => "staff",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "student" => Some(UserRole::Student),
            "parent" => Some(UserRole::Parent),
            "staff" => Some(UserRole::Staff),
            _ => None,
        }
    }
}

/// Persisted user, as needed for ownership checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingUser {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub external_user_id: String,
    pub role: UserRole,
}
