use domain::{RequiredField, ValidationResult};
use tracing::debug;

use crate::error::PageError;
use crate::traits::{FieldAccessor, Notifier};

/// Checks required fields in order and stops at the first empty one, whose
/// message goes to the notifier.
pub fn validate<A>(
    fields: &A,
    notifier: &dyn Notifier,
    required: &[RequiredField],
) -> Result<ValidationResult, PageError>
where
    A: FieldAccessor + ?Sized,
{
    for field in required {
        if fields.value_by_id(field.field_id)?.is_empty() {
            debug!("Validation failed on '{}'", field.field_id);
            notifier.notify(field.message);
            return Ok(ValidationResult::Invalid {
                field_id: field.field_id,
                message: field.message,
            });
        }
    }
    Ok(ValidationResult::Valid)
}
