//! Field validators
//!
//! Pure functions over one candidate record and the batch lookup maps.
//! Each returns the resolved value or the first [`FieldError`] it finds;
//! the validation manager stops at the first error of a record.

pub mod enrollment_status;
pub mod grade;
pub mod identity;
pub mod locations;
pub mod ownership;
pub mod phone_numbers;
pub mod school_histories;
pub mod tags;
pub mod user_address;

use crate::field_error::FieldError;

/// Outcome of a single field validator
pub type FieldResult<T> = std::result::Result<T, FieldError>;

/// Position of the first repeated value, if any
pub(crate) fn first_duplicate_position<'a, I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .enumerate()
        .find(|(_, value)| !seen.insert(*value))
        .map(|(position, _)| position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_duplicate_position() {
        assert_eq!(first_duplicate_position(["a", "b", "c"]), None);
        assert_eq!(first_duplicate_position(["a", "b", "a", "b"]), Some(2));
        assert_eq!(first_duplicate_position(Vec::<&str>::new()), None);
    }
}
