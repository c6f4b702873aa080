use crate::compose::{self, Environment};
use crate::dump::{DumpContext, create_dump};
use crate::error::AppError;
use crate::options::{BackupOptions, BackupRequest};

pub fn execute_backup(request: BackupRequest) -> Result<(), AppError> {
    let options = BackupOptions::from_request(request)?;
    let environment = Environment::from_env_file(&options.project_dir)?;
    let config_files = compose::find_compose_files(&options.project_dir, &options.compose_files)?;
    let config = compose::load(&config_files, &environment)?;
    let services = compose::select_services(&config, &options.services)?;

    if options.verbose {
        eprintln!("Invoking project dump with these settings: {options:?}");
    }

    let ctx = DumpContext { options, config, config_files, environment, services };
    create_dump(&ctx)
}
