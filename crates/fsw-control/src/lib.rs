mod command;
mod controller;
mod mode;

pub use command::{CmdKind, CommandHandler, CommandHandlerConfig};
pub use controller::Controller;
pub use mode::Mode;
