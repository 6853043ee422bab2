//! MySQL/MariaDB backend implementation

mod backend;
mod option_file;
mod session;

pub use backend::{DEFAULT_HOST, DEFAULT_PORT, MySqlBackend, build_opts};
pub use option_file::{OptionValues, default_option_files, parse_option_groups, read_option_groups};
pub use session::MySqlSession;
