use std::fmt;

/// Hard ceiling on the number of images a single customer may own.
pub const MAX_IMAGES_PER_CUSTOMER: u64 = 10;

/// Whether a customer currently owning `image_count` images has room for one more.
pub fn can_add_more_images(image_count: u64) -> bool {
    image_count < MAX_IMAGES_PER_CUSTOMER
}

/// Slots left before the ceiling is reached.
pub fn remaining_capacity(current: u64) -> u64 {
    MAX_IMAGES_PER_CUSTOMER.saturating_sub(current)
}

/// A batch that would push a customer over the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaExceeded {
    pub current: u64,
    pub requested: u64,
}

impl fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cannot upload {} images. Customer already has {} images. \
             Maximum allowed is {}. You can upload {} more image(s).",
            self.requested,
            self.current,
            MAX_IMAGES_PER_CUSTOMER,
            remaining_capacity(self.current)
        )
    }
}

impl std::error::Error for QuotaExceeded {}

/// Check that `requested` more images fit next to the `current` ones.
pub fn check_capacity(current: u64, requested: u64) -> Result<(), QuotaExceeded> {
    if current.saturating_add(requested) > MAX_IMAGES_PER_CUSTOMER {
        return Err(QuotaExceeded { current, requested });
    }
    Ok(())
}
