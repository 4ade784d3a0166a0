use std::path::PathBuf;

use thiserror::Error;

pub type UvmGenCliResult<T> = Result<T, UvmGenCliError>;

#[derive(Error, Debug)]
pub enum UvmGenCliError {
    #[error("Invalid extension: RTL file must be .sv or .v (got {})", _0.to_string_lossy())]
    InvalidExtension(PathBuf),
    #[error("{}", _0)]
    UvmGen(uvm_gen::Error),
}

impl From<uvm_gen::Error> for UvmGenCliError {
    fn from(error: uvm_gen::Error) -> Self {
        Self::UvmGen(error)
    }
}
