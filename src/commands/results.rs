use futures::future::{FutureExt, LocalBoxFuture};

use crate::shell::{Reply, Shell};

pub const RESULTS: &str = "results";
pub const WATCH: &str = "watch";

pub fn results(shell: &mut Shell, _args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move { Ok(Reply::Text(shell.results.current().render())) }.boxed_local()
}

pub fn watch(_shell: &mut Shell, _args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move { Ok(Reply::Watch) }.boxed_local()
}
