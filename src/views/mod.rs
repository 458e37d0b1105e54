pub mod poller;
pub mod results;
pub mod user_form;
pub mod vote_form;

pub use poller::ResultsPoller;
pub use results::ResultsView;
pub use user_form::{FormMode, UserForm};
pub use vote_form::VoteForm;
