use crate::error::AppError;

pub fn execute_restore() -> Result<(), AppError> {
    Err(AppError::RestoreUnimplemented)
}
