use futures::future::{FutureExt, LocalBoxFuture};

use crate::helpers::command_args::{find_arg, find_rest};
use crate::shell::{Reply, Shell};

pub const REGISTER: &str = "register";
pub const LOGIN: &str = "login";
pub const LOGOUT: &str = "logout";

pub fn register(shell: &mut Shell, args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move {
        shell
            .user_form
            .fill_register(find_arg(&args, 0), find_arg(&args, 1), &find_rest(&args, 2));

        let progress = shell.progress.clone();
        let submitted = shell
            .user_form
            .submit_with(&shell.client, &mut shell.session, |form| progress.show(form.render()))
            .await;

        match submitted {
            Some(user) => {
                shell.vote_form.clear();
                Ok(Reply::Text(format!("Bienvenue {} !\n\n{}", user.pseudo, shell.screen())))
            }
            None => Ok(Reply::Text(shell.user_form.render())),
        }
    }
    .boxed_local()
}

pub fn login(shell: &mut Shell, args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move {
        shell.user_form.fill_login(find_arg(&args, 0), &find_rest(&args, 1));

        let progress = shell.progress.clone();
        let submitted = shell
            .user_form
            .submit_with(&shell.client, &mut shell.session, |form| progress.show(form.render()))
            .await;

        match submitted {
            Some(user) => {
                shell.vote_form.clear();
                Ok(Reply::Text(format!("Bon retour {} !\n\n{}", user.pseudo, shell.screen())))
            }
            None => Ok(Reply::Text(shell.user_form.render())),
        }
    }
    .boxed_local()
}

pub fn logout(shell: &mut Shell, _args: Vec<String>) -> LocalBoxFuture<'_, anyhow::Result<Reply>> {
    async move {
        if let Err(e) = shell.session.logout() {
            return Ok(Reply::Text(e.to_string()));
        }

        shell.vote_form.clear();
        Ok(Reply::Text(format!("Vous êtes déconnecté.\n\n{}", shell.screen())))
    }
    .boxed_local()
}
