mod context;
mod dispatcher;
mod parser;
mod registry;

pub use context::CommandContext;
pub use dispatcher::CommandDispatcher;
pub use parser::{CommandParser, MatchMode};
pub use registry::{Command, CommandRegistry};
