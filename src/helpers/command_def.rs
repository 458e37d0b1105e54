use futures::future::LocalBoxFuture;

use crate::shell::{Reply, Shell};

pub type CommandHandler = for<'a> fn(&'a mut Shell, Vec<String>) -> LocalBoxFuture<'a, anyhow::Result<Reply>>;

pub struct CommandDef {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
    pub handler: CommandHandler,
}
