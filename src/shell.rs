use std::time::Duration;

use evlog::meta;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::commands;
use crate::helpers::command_args::split_line;
use crate::runtime::get_logger;
use crate::session::{Session, SessionState};
use crate::views::{ResultsPoller, ResultsView, UserForm, VoteForm};

pub const PROMPT: &str = "bayrou> ";
pub const INVALID_INPUT_MESSAGE: &str = "Entrée illisible : le texte doit être en UTF-8.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Re-render the results on every refresh until the next input line.
    Watch,
    Quit,
}

/// Frames printed while a command is still waiting on the backend.
#[derive(Debug, Clone, Default)]
pub struct Progress(Option<mpsc::UnboundedSender<String>>);

impl Progress {
    pub fn show(&self, frame: String) {
        if let Some(tx) = &self.0 {
            // The receiver only goes away once `run` has returned.
            let _ = tx.send(frame);
        }
    }
}

/// Terminal front-end: one session, its two forms and the live results.
pub struct Shell {
    pub(crate) client: ApiClient,
    pub(crate) session: Session,
    pub(crate) user_form: UserForm,
    pub(crate) vote_form: VoteForm,
    pub(crate) results: ResultsPoller,
    pub(crate) progress: Progress,
}

impl Shell {
    /// Must be called from within a tokio runtime; the results poller starts immediately.
    pub fn new(client: ApiClient, poll_interval: Duration) -> Self {
        let results = ResultsPoller::spawn(client.clone(), poll_interval);

        Self {
            client,
            session: Session::new(),
            user_form: UserForm::default(),
            vote_form: VoteForm::default(),
            results,
            progress: Progress::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user_form(&self) -> &UserForm {
        &self.user_form
    }

    pub fn vote_form(&self) -> &VoteForm {
        &self.vote_form
    }

    pub fn results(&self) -> ResultsView {
        self.results.current()
    }

    pub fn results_poller(&self) -> &ResultsPoller {
        &self.results
    }

    /// The form or message matching the current session phase.
    pub fn screen(&self) -> String {
        match self.session.state() {
            SessionState::Anonymous => self.user_form.render(),
            SessionState::Identified(user) => {
                let results = self.results.current();
                self.vote_form.render(&user.pseudo, results.question())
            }
            SessionState::Voted(user) => {
                let mut out = vec![
                    "== Merci pour votre vote ! ==".to_owned(),
                    format!("Merci {} pour votre participation.", user.pseudo),
                    "Découvrez les résultats avec `results` ou `watch`.".to_owned(),
                ];
                if let Some(summary) = self.results.current().summary() {
                    out.push(format!("Tendance actuelle : {}", summary));
                }
                out.push("> new : nouveau vote   |   logout : se déconnecter".to_owned());
                out.join("\n")
            }
        }
    }

    pub async fn dispatch(&mut self, line: &str) -> anyhow::Result<Reply> {
        let (name, args) = match split_line(line) {
            None => return Ok(Reply::Text(String::new())),
            Some(v) => v,
        };

        let handler = match commands::get_handler(&name) {
            None => {
                return Ok(Reply::Text(format!(
                    "Commande inconnue : {}\nCommandes :\n{}",
                    name,
                    commands::help_text()
                )));
            }
            Some(v) => v,
        };

        get_logger().debug("Dispatching command.", meta![
            "Command" => name.clone(),
            "State" => self.session.state().name(),
        ]);

        handler(self, args).await
    }

    /// Reads commands line by line until `quit` or end of input.
    pub async fn run<R, W>(&mut self, mut input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        let mut updates = self.results.subscribe();
        let mut watching = false;

        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        self.progress = Progress(Some(progress_tx));

        write_block(&mut output, &format!("{}\n\n{}", banner(), self.screen())).await?;
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        loop {
            tokio::select! {
                read = input.read_until(b'\n', &mut buf) => {
                    if read? == 0 {
                        break;
                    }
                    let raw = std::mem::take(&mut buf);
                    watching = false;

                    let line = match String::from_utf8(raw) {
                        Ok(v) => v.trim_end_matches(['\n', '\r']).to_owned(),
                        Err(e) => {
                            get_logger().info("Discarded unreadable input line.", meta![
                                "Error" => e.to_string(),
                            ]);
                            write_block(&mut output, &format!("! {}", INVALID_INPUT_MESSAGE)).await?;
                            output.write_all(PROMPT.as_bytes()).await?;
                            output.flush().await?;
                            continue;
                        }
                    };

                    let reply = {
                        let dispatch = self.dispatch(&line);
                        tokio::pin!(dispatch);
                        loop {
                            tokio::select! {
                                biased;
                                Some(frame) = progress_rx.recv() => write_block(&mut output, &frame).await?,
                                reply = &mut dispatch => break reply,
                            }
                        }
                    };
                    // A frame queued by a command that finished without waiting is already stale.
                    while progress_rx.try_recv().is_ok() {}

                    match reply {
                        Ok(Reply::Text(text)) => {
                            if !text.is_empty() {
                                write_block(&mut output, &text).await?;
                            }
                        }
                        Ok(Reply::Watch) => {
                            watching = true;
                            let text = updates.borrow_and_update().render();
                            write_block(&mut output, &format!("{}\n(Entrée pour arrêter)", text)).await?;
                            continue;
                        }
                        Ok(Reply::Quit) => break,
                        Err(e) => {
                            get_logger().error("Error occurred in command processor.", meta![
                                "Line" => line.clone(),
                                "Error" => e.to_string(),
                            ]);
                            write_block(&mut output, &format!("! {}", e)).await?;
                        }
                    }

                    output.write_all(PROMPT.as_bytes()).await?;
                    output.flush().await?;
                }
                changed = updates.changed(), if watching => {
                    if changed.is_err() {
                        watching = false;
                        continue;
                    }
                    let text = updates.borrow_and_update().render();
                    write_block(&mut output, &text).await?;
                }
            }
        }

        self.progress = Progress::default();
        write_block(&mut output, "Au revoir !").await?;
        Ok(())
    }
}

fn banner() -> &'static str {
    "Bayrou Meter - l'application qui mesure l'opinion publique sur François Bayrou.\nTapez `help` pour la liste des commandes."
}

async fn write_block<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> anyhow::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
