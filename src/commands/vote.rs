use futures::future::{FutureExt, LocalBoxFuture};

use crate::helpers::command_args::find_arg;
use crate::session::SessionState;
use crate::shell::{Reply, Shell};

pub const VOTE: &str = "vote";
pub const NEW_VOTE: &str = "new";

pub fn vote(shell: &mut Shell, args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move {
        let progress = shell.progress.clone();
        let pseudo = shell.session.current_user().map(|u| u.pseudo.clone()).unwrap_or_default();
        let question = shell.results.current().question().to_owned();

        let submitted = shell
            .vote_form
            .submit_text_with(&shell.client, &mut shell.session, find_arg(&args, 0), |form| {
                progress.show(form.render(&pseudo, &question))
            })
            .await;

        match submitted {
            Some(_) => {
                shell.results.refresh();
                Ok(Reply::Text(shell.screen()))
            }
            None => {
                let screen = shell.screen();
                match shell.vote_form.error() {
                    // Outside the vote form the error would not be visible otherwise.
                    Some(e) if !matches!(shell.session.state(), SessionState::Identified(_)) => {
                        Ok(Reply::Text(format!("! {}\n\n{}", e, screen)))
                    }
                    _ => Ok(Reply::Text(screen)),
                }
            }
        }
    }
    .boxed_local()
}

pub fn new_vote(shell: &mut Shell, _args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move {
        if let Err(e) = shell.session.start_new_vote() {
            return Ok(Reply::Text(e.to_string()));
        }

        shell.vote_form.clear();
        Ok(Reply::Text(shell.screen()))
    }
    .boxed_local()
}
