pub mod cli;
pub mod config;
pub mod errors;
pub mod model;
pub mod runner;

pub mod io {
    pub mod lazy_file;
    pub mod tee;
}

pub mod util {
    pub mod logging;
}

pub mod subcommands {
    pub mod check;
    pub mod run;
}

pub use errors::{Error, Result};
pub use io::lazy_file::{make_log_writer, LazyFile};
pub use io::tee::MultiWriter;
pub use runner::{run_logged_cmd, run_logged_cmd_dir_output, LoggedRunner};
