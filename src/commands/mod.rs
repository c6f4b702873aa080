pub mod backup;
pub mod restore;

pub use backup::execute_backup;
pub use restore::execute_restore;
