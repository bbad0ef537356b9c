//! Intake domain: the `{name, age, done}` record, age coercion, the
//! carried draft and the PENDING -> OK registration state machine.

mod draft;
mod record;
mod row;
mod status;

pub use draft::IntakeDraft;
pub use record::{coerce_age, coerce_age_text, IntakeRecord, MAX_AGE};
pub use row::PersistedIntakeRow;
pub use status::{evaluate, IntakeEvaluation, IntakeField, IntakeStatus};
