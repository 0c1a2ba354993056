//! Domain models for student validation

pub mod enrollment;
pub mod outcome;
pub mod reference;
pub mod student;

pub use enrollment::{EnrollmentStatus, EnrollmentStatusHistory};
pub use outcome::{
    BatchRejected, ResolvedAddress, ResolvedSchoolHistory, ValidatedStudent, ValidationMode,
    ValidationOutcome,
};
pub use reference::{
    ExistingUser, Grade, Location, Prefecture, School, SchoolCourse, Tag, TagType, UserRole,
};
pub use student::{
    EnrollmentStatusInput, Gender, PhoneNumberInput, PhoneNumberKind, SchoolHistoryInput,
    StudentRecord, UserAddressInput,
};
