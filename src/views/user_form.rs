use evlog::meta;

use crate::api::types::{CreateUserRequest, LoginRequest, User};
use crate::api::{ApiClient, ApiError};
use crate::runtime::get_logger;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Register,
    Login,
}

impl FormMode {
    fn submit_label(&self, pending: bool) -> &'static str {
        match (self, pending) {
            (FormMode::Register, false) => "S'inscrire",
            (FormMode::Register, true) => "Inscription...",
            (FormMode::Login, false) => "Se connecter",
            (FormMode::Login, true) => "Connexion...",
        }
    }
}

/// Registration / login form. Holds what was typed, the last error and whether a call is running.
#[derive(Debug, Clone)]
pub struct UserForm {
    mode: FormMode,
    pseudo: String,
    email: String,
    password: String,
    error: Option<String>,
    pending: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            mode: FormMode::Register,
            pseudo: String::new(),
            email: String::new(),
            password: String::new(),
            error: None,
            pending: false,
        }
    }
}

impl UserForm {
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn pseudo(&self) -> &str {
        &self.pseudo
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_mode(&mut self, mode: FormMode) {
        if self.mode != mode {
            self.mode = mode;
            self.error = None;
        }
    }

    pub fn fill_register(&mut self, pseudo: &str, email: &str, password: &str) {
        self.set_mode(FormMode::Register);
        self.pseudo = pseudo.to_owned();
        self.email = email.to_owned();
        self.password = password.to_owned();
    }

    pub fn fill_login(&mut self, email: &str, password: &str) {
        self.set_mode(FormMode::Login);
        self.email = email.to_owned();
        self.password = password.to_owned();
    }

    /// Sends the form. On success the session becomes identified and the fields are cleared; on
    /// failure the error is kept on the form and the session is left alone.
    pub async fn submit(&mut self, client: &ApiClient, session: &mut Session) -> Option<User> {
        self.submit_with(client, session, |_| {}).await
    }

    /// Like [`UserForm::submit`], calling `on_pending` with the busy form once the request is about
    /// to go out. Nothing is called when the form is rejected locally.
    pub async fn submit_with<F>(&mut self, client: &ApiClient, session: &mut Session, on_pending: F) -> Option<User>
    where
        F: FnOnce(&Self),
    {
        if let Err(e) = session.ensure_anonymous() {
            self.error = Some(e.to_string());
            return None;
        }

        let result = match self.mode {
            FormMode::Register => {
                let request = match CreateUserRequest::new(&self.pseudo, &self.email, &self.password) {
                    Ok(v) => v,
                    Err(e) => return self.fail(e),
                };
                let _guard = match session.begin_request() {
                    Ok(v) => v,
                    Err(e) => {
                        self.error = Some(e.to_string());
                        return None;
                    }
                };

                self.pending = true;
                on_pending(&*self);
                let result = client.create_user(&request).await;
                self.pending = false;
                result
            }
            FormMode::Login => {
                let request = match LoginRequest::new(&self.email, &self.password) {
                    Ok(v) => v,
                    Err(e) => return self.fail(e),
                };
                let _guard = match session.begin_request() {
                    Ok(v) => v,
                    Err(e) => {
                        self.error = Some(e.to_string());
                        return None;
                    }
                };

                self.pending = true;
                on_pending(&*self);
                let result = client.login_user(&request).await;
                self.pending = false;
                result
            }
        };

        let user = match result {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };

        if let Err(e) = session.authenticate(user.clone()) {
            self.error = Some(e.to_string());
            return None;
        }

        self.error = None;
        self.password.clear();
        self.email.clear();
        if self.mode == FormMode::Register {
            self.pseudo.clear();
        }

        Some(user)
    }

    fn fail(&mut self, e: ApiError) -> Option<User> {
        if e.is_preflight() {
            get_logger().debug("Identification form rejected.", meta![
                "Mode" => format!("{:?}", self.mode),
                "Error" => e.to_string(),
            ]);
        } else {
            get_logger().info("Identification failed.", meta![
                "Mode" => format!("{:?}", self.mode),
                "Email" => self.email.clone(),
                "Error" => e.to_string(),
            ]);
        }
        self.error = Some(e.user_message());
        None
    }

    pub fn render(&self) -> String {
        let mut out = vec!["== Identification ==".to_owned()];

        let (register, login) = match self.mode {
            FormMode::Register => ("[S'inscrire]", " Se connecter "),
            FormMode::Login => (" S'inscrire ", "[Se connecter]"),
        };
        out.push(format!("{} {}", register, login));

        if self.mode == FormMode::Register {
            out.push(format!("Pseudo : {}", self.pseudo));
        }
        out.push(format!("Email  : {}", self.email));

        if let Some(e) = &self.error {
            out.push(format!("! {}", e));
        }

        match self.mode {
            FormMode::Register => out.push(format!(
                "> register <pseudo> <email> <password>   ({})",
                self.mode.submit_label(self.pending)
            )),
            FormMode::Login => out.push(format!(
                "> login <email> <password>   ({})",
                self.mode.submit_label(self.pending)
            )),
        }

        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn starts_in_register_mode() {
        let form = UserForm::default();
        assert_eq!(form.mode(), FormMode::Register);
        assert!(form.render().contains("Pseudo"));
        assert!(form.render().contains("(S'inscrire)"));
    }

    #[rstest]
    fn login_does_not_show_pseudo() {
        let mut form = UserForm::default();
        form.fill_login("a@x.com", "p");
        assert!(!form.render().contains("Pseudo"));
    }

    #[rstest]
    #[case(FormMode::Register, "(Inscription...)")]
    #[case(FormMode::Login, "(Connexion...)")]
    fn pending_form_shows_progress_label(#[case] mode: FormMode, #[case] expected: &str) {
        let mut form = UserForm::default();
        form.set_mode(mode);
        form.pending = true;
        assert!(form.render().contains(expected));
    }

    #[rstest]
    fn switching_mode_clears_error() {
        let mut form = UserForm::default();
        form.error = Some("Email already exists".to_owned());

        form.set_mode(FormMode::Register);
        assert!(form.error().is_some());

        form.set_mode(FormMode::Login);
        assert!(form.error().is_none());
    }

    #[rstest]
    fn renders_error_inline() {
        let mut form = UserForm::default();
        form.error = Some("Email already exists".to_owned());
        assert!(form.render().contains("! Email already exists"));
    }
}
