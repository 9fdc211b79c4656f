use common::ServiceError;

pub const VALIDATION_FAILED: &str = "Validation failed.";

/// Collects field-level problems so a request reports all of them at once.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Required, non-blank, at most `max` characters.
    pub fn required(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.push(format!("{field} is required."));
        } else {
            self.max_len(field, value, max);
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(format!("{field} must be at most {max} characters."));
        }
    }

    /// Prefix every message collected by `f` with `scope`.
    pub fn scoped(&mut self, scope: &str, f: impl FnOnce(&mut FieldErrors)) {
        let mut inner = FieldErrors::new();
        f(&mut inner);
        self.0
            .extend(inner.0.into_iter().map(|m| format!("{scope}: {m}")));
    }

    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::validation(VALIDATION_FAILED, self.0))
        }
    }
}

/// One `@`, non-empty on both sides, no whitespace.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
