mod constants;
mod env;
mod file;
mod load;
mod paths;
mod types;
mod util;

pub use types::LabConfig;
