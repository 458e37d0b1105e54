use chrono::Local;
use evlog::meta;
use itertools::Itertools;

use crate::api::error::ApiResult;
use crate::api::types::{Choice, VotesPage, DEFAULT_QUESTION};
use crate::runtime::get_logger;
use crate::support::display::{choice_badge, format_date, format_percentage, progress_bar, BAR_WIDTH};

pub const TITLE: &str = "Résultats en temps réel";
pub const LOADING_MESSAGE: &str = "Chargement des résultats...";
pub const LOAD_ERROR_MESSAGE: &str = "Erreur lors du chargement des résultats";
pub const NO_VOTES_MESSAGE: &str = "Aucun vote pour le moment. Soyez le premier à voter !";

/// Last known results plus the outcome of the most recent read.
///
/// A failed read never clears `page`: the previous results stay on screen with the error under them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    page: Option<VotesPage>,
    error: Option<String>,
    loading: bool,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self {
            page: None,
            error: None,
            loading: true,
        }
    }
}

impl ResultsView {
    pub fn page(&self) -> Option<&VotesPage> {
        self.page.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn question(&self) -> &str {
        self.page
            .as_ref()
            .map(|p| p.question.as_str())
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(DEFAULT_QUESTION)
    }

    pub fn apply(&mut self, result: ApiResult<VotesPage>) {
        self.loading = false;

        match result {
            Ok(page) => {
                if !page.stats.is_consistent() {
                    get_logger().info("Server returned inconsistent stats.", meta![
                        "Oui" => page.stats.oui,
                        "Non" => page.stats.non,
                        "Total" => page.stats.total,
                        "OuiPercentage" => page.stats.oui_percentage,
                        "NonPercentage" => page.stats.non_percentage,
                    ]);
                }
                self.page = Some(page);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.user_message());
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = Vec::new();
        out.push(format!("== {} ==", TITLE));

        let page = match &self.page {
            Some(v) => v,
            None => {
                if self.loading {
                    out.push(LOADING_MESSAGE.to_owned());
                } else {
                    out.push(LOAD_ERROR_MESSAGE.to_owned());
                }
                if let Some(e) = &self.error {
                    out.push(format!("! {}", e));
                }
                return out.join("\n");
            }
        };

        out.push(page.question.clone());

        if page.stats.total == 0 {
            out.push(NO_VOTES_MESSAGE.to_owned());
        } else {
            let stats = &page.stats;
            out.push(format!(
                "Oui: {} ({})   Non: {} ({})   Total: {}",
                stats.oui,
                format_percentage(stats.oui_percentage),
                stats.non,
                format_percentage(stats.non_percentage),
                stats.total,
            ));
            out.push(format!("[{}]", progress_bar(stats, BAR_WIDTH)));
            out.push(String::new());
            out.push(format!("Derniers votes ({})", page.votes.len()));

            let lines = page
                .votes
                .iter()
                .map(|vote| {
                    let at = match vote.created_at_utc() {
                        Some(v) => format_date(&v.with_timezone(&Local)),
                        None => vote.created_at.clone(),
                    };
                    format!("  {:<20} {:<19}  {}", vote.user.pseudo, at, choice_badge(vote.choice))
                })
                .join("\n");
            if !lines.is_empty() {
                out.push(lines);
            }
        }

        if let Some(e) = &self.error {
            out.push(format!("! {}", e));
        }

        out.join("\n")
    }

    /// One-line summary, used for the prompt after a vote.
    pub fn summary(&self) -> Option<String> {
        let stats = &self.page.as_ref()?.stats;
        Some(
            Choice::ALL
                .iter()
                .map(|c| format!("{} {}", c.label(), format_percentage(stats.percentage(*c))))
                .join(" / "),
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::api::error::{ApiError, TransportError, UNKNOWN_ERROR_MESSAGE};
    use crate::api::types::{Vote, VoteStats, VoteUser};

    #[fixture]
    fn page() -> VotesPage {
        VotesPage {
            votes: vec![
                Vote {
                    id: "v-2".to_owned(),
                    user: VoteUser { id: "u-2".to_owned(), pseudo: "bob".to_owned() },
                    choice: Choice::Non,
                    question: DEFAULT_QUESTION.to_owned(),
                    created_at: "2025-09-10T14:05:00".to_owned(),
                },
                Vote {
                    id: "v-1".to_owned(),
                    user: VoteUser { id: "u-1".to_owned(), pseudo: "alice".to_owned() },
                    choice: Choice::Oui,
                    question: DEFAULT_QUESTION.to_owned(),
                    created_at: "2025-09-10T14:03:00".to_owned(),
                },
            ],
            stats: VoteStats { oui: 1, non: 1, total: 2, oui_percentage: 50.0, non_percentage: 50.0 },
            question: DEFAULT_QUESTION.to_owned(),
        }
    }

    fn refused() -> ApiError {
        ApiError::Transport(TransportError::Connect("connection refused".to_owned()))
    }

    #[rstest]
    fn renders_loading_before_first_read() {
        let view = ResultsView::default();
        assert!(view.is_loading());
        assert!(view.render().contains(LOADING_MESSAGE));
        assert_eq!(view.question(), DEFAULT_QUESTION);
    }

    #[rstest]
    fn renders_error_placeholder_when_nothing_fetched() {
        let mut view = ResultsView::default();
        view.apply(Err(refused()));

        let text = view.render();
        assert!(text.contains(LOAD_ERROR_MESSAGE));
        assert!(text.contains(UNKNOWN_ERROR_MESSAGE));
        assert!(!view.is_loading());
    }

    #[rstest]
    fn renders_stats_and_recent_votes(page: VotesPage) {
        let mut view = ResultsView::default();
        view.apply(Ok(page));

        let text = view.render();
        assert!(text.contains("Oui: 1 (50%)"));
        assert!(text.contains("Total: 2"));
        assert!(text.contains("Derniers votes (2)"));
        assert!(text.contains("alice"));
        assert!(text.contains("bob"));
        assert_eq!(view.summary().unwrap(), "Oui 50% / Non 50%");
    }

    #[rstest]
    fn renders_no_votes_placeholder(mut page: VotesPage) {
        page.votes.clear();
        page.stats = VoteStats::empty();

        let mut view = ResultsView::default();
        view.apply(Ok(page));

        assert!(view.render().contains(NO_VOTES_MESSAGE));
    }

    #[rstest]
    fn failed_refresh_keeps_last_results(page: VotesPage) {
        let mut view = ResultsView::default();
        view.apply(Ok(page.clone()));
        view.apply(Err(refused()));

        assert_eq!(view.page(), Some(&page));
        assert_eq!(view.error(), Some(UNKNOWN_ERROR_MESSAGE));
        assert!(!view.is_loading());

        let text = view.render();
        assert!(text.contains("Derniers votes (2)"));
        assert!(text.contains(UNKNOWN_ERROR_MESSAGE));
    }

    #[rstest]
    fn successful_refresh_clears_error(page: VotesPage) {
        let mut view = ResultsView::default();
        view.apply(Err(refused()));
        view.apply(Ok(page));

        assert!(view.error().is_none());
        assert!(!view.render().contains(UNKNOWN_ERROR_MESSAGE));
    }
}
