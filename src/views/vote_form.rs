use evlog::meta;

use crate::api::types::{Choice, SubmitVoteRequest, SubmittedVote};
use crate::api::ApiClient;
use crate::runtime::get_logger;
use crate::session::Session;

#[derive(Debug, Clone, Default)]
pub struct VoteForm {
    error: Option<String>,
    pending: bool,
}

impl VoteForm {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear(&mut self) {
        self.error = None;
    }

    /// Parses the typed choice first; anything other than oui/non stays on the form and is never sent.
    pub async fn submit_text(&mut self, client: &ApiClient, session: &mut Session, choice: &str) -> Option<SubmittedVote> {
        self.submit_text_with(client, session, choice, |_| {}).await
    }

    /// Like [`VoteForm::submit_text`], calling `on_pending` with the busy form just before the vote
    /// is sent.
    pub async fn submit_text_with<F>(
        &mut self,
        client: &ApiClient,
        session: &mut Session,
        choice: &str,
        on_pending: F,
    ) -> Option<SubmittedVote>
    where
        F: FnOnce(&Self),
    {
        match choice.parse::<Choice>() {
            Ok(v) => self.submit_with(client, session, v, on_pending).await,
            Err(e) => {
                self.error = Some(e.user_message());
                None
            }
        }
    }

    pub async fn submit(&mut self, client: &ApiClient, session: &mut Session, choice: Choice) -> Option<SubmittedVote> {
        self.submit_with(client, session, choice, |_| {}).await
    }

    pub async fn submit_with<F>(
        &mut self,
        client: &ApiClient,
        session: &mut Session,
        choice: Choice,
        on_pending: F,
    ) -> Option<SubmittedVote>
    where
        F: FnOnce(&Self),
    {
        let request = match session.voter() {
            Ok(user) => match SubmitVoteRequest::new(&user.id, choice) {
                Ok(v) => v,
                Err(e) => {
                    self.error = Some(e.user_message());
                    return None;
                }
            },
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };

        let guard = match session.begin_request() {
            Ok(v) => v,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };

        self.pending = true;
        on_pending(&*self);
        let result = client.submit_vote(&request).await;
        self.pending = false;
        drop(guard);

        let vote = match result {
            Ok(v) => v,
            Err(e) => {
                get_logger().info("Vote was not recorded.", meta![
                    "UserID" => request.user_id.clone(),
                    "Choice" => choice,
                    "Error" => e.to_string(),
                ]);
                self.error = Some(e.user_message());
                return None;
            }
        };

        if let Err(e) = session.record_vote() {
            self.error = Some(e.to_string());
            return None;
        }

        self.error = None;
        Some(vote)
    }

    pub fn render(&self, pseudo: &str, question: &str) -> String {
        let mut out = vec![
            format!("== Bonjour {} ! ==", pseudo),
            "Voici la question qui nous préoccupe tous...".to_owned(),
            format!("  {}", question),
        ];

        if let Some(e) = &self.error {
            out.push(format!("! {}", e));
        }

        if self.pending {
            out.push("Enregistrement de votre vote...".to_owned());
        } else {
            out.push("> vote oui   |   vote non".to_owned());
        }

        out.join("\n")
    }
}
