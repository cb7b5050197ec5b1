pub mod build;
pub mod compile_run;
mod dispatch;
pub mod init;
pub mod log;
pub mod methods;
pub mod run;

pub use build::build_command;
pub use compile_run::compile_run_command;
pub use init::init_command;
pub use log::log_command;
pub use methods::methods_command;
pub use run::run_command;
