pub mod context;
pub mod events;
pub mod fields;
pub mod phone_mask;
pub mod validation;

pub use context::{Controls, FormContext, FormView, StatusNotice};
pub use events::{Effect, FormEvent, Key, Timer};
pub use fields::{Decoration, FieldControl, FieldId, FieldSpec, RatingSlot, Slider, VALIDATED_FIELDS};
pub use phone_mask::{PhoneInput, COMPLETE_LEN, MIN_CURSOR, PHONE_PREFIX};
pub use validation::FieldKind;
