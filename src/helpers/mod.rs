pub mod command_args;
pub mod command_def;
