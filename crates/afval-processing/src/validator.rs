//! Photo file validation: MIME type and size ceiling.

use afval_core::AppError;

/// Validates user-provided photo files before optimization.
pub struct PhotoValidator {
    max_file_size: usize,
}

impl PhotoValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Only `image/*` content is accepted.
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), AppError> {
        if !content_type.to_lowercase().starts_with("image/") {
            return Err(AppError::UnsupportedMediaType(content_type.to_string()));
        }
        Ok(())
    }

    pub fn validate_size(&self, size: usize) -> Result<(), AppError> {
        if size == 0 {
            return Err(AppError::Validation("empty photo file".to_string()));
        }
        if size > self.max_file_size {
            return Err(AppError::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }

    pub fn validate_all(&self, content_type: &str, size: usize) -> Result<(), AppError> {
        self.validate_content_type(content_type)?;
        self.validate_size(size)?;
        Ok(())
    }
}
