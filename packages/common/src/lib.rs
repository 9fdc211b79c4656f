pub mod clock;
pub mod envelope;
pub mod error;
pub mod quota;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use envelope::{ApiResponse, Envelope};
pub use error::ServiceError;
pub use quota::{MAX_IMAGES_PER_CUSTOMER, QuotaExceeded};
pub use validation::{ImageCandidate, ImageRejection, ValidatedImage};
