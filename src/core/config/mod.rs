pub mod data;
pub mod io;
pub mod printing;

pub use data::{CloudCredentials, CloudSettings, Config};
pub use io::ConfigError;
