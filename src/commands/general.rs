use futures::future::{FutureExt, LocalBoxFuture};

use crate::commands::help_text;
use crate::shell::{Reply, Shell};

pub const STATUS: &str = "status";
pub const HELP: &str = "help";
pub const QUIT: &str = "quit";

pub fn status(shell: &mut Shell, _args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move { Ok(Reply::Text(shell.screen())) }.boxed_local()
}

pub fn help(_shell: &mut Shell, _args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move { Ok(Reply::Text(format!("Commandes :\n{}", help_text()))) }.boxed_local()
}

pub fn quit(_shell: &mut Shell, _args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move { Ok(Reply::Quit) }.boxed_local()
}
