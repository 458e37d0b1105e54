use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;

/// The single question every vote answers, as hard-coded by the backend.
pub const DEFAULT_QUESTION: &str = "Est-ce que François Bayrou nous manque ?";

static VALIDATE_EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub pseudo: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Oui,
    Non,
}

impl Choice {
    pub const ALL: [Choice; 2] = [Choice::Oui, Choice::Non];

    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Oui => "oui",
            Choice::Non => "non",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Choice::Oui => "Oui",
            Choice::Non => "Non",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oui" => Ok(Choice::Oui),
            "non" => Ok(Choice::Non),
            _ => Err(ApiError::Invalid("Le choix doit être 'oui' ou 'non'".to_owned())),
        }
    }
}

//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateUserRequest {
    pub pseudo: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn new(pseudo: &str, email: &str, password: &str) -> Result<Self, ApiError> {
        let request = Self {
            pseudo: pseudo.trim().to_owned(),
            email: email.trim().to_owned(),
            password: password.to_owned(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        require("Le pseudo", &self.pseudo)?;
        require_email(&self.email)?;
        require("Le mot de passe", &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: &str) -> Result<Self, ApiError> {
        let request = Self {
            email: email.trim().to_owned(),
            password: password.to_owned(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        require_email(&self.email)?;
        require("Le mot de passe", &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitVoteRequest {
    pub user_id: String,
    pub choice: Choice,
}

impl SubmitVoteRequest {
    pub fn new(user_id: &str, choice: Choice) -> Result<Self, ApiError> {
        let request = Self {
            user_id: user_id.trim().to_owned(),
            choice,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        require("L'identifiant utilisateur", &self.user_id)
    }
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Invalid(format!("{} est requis", field)));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<(), ApiError> {
    require("L'email", email)?;
    if !VALIDATE_EMAIL.is_match(email.trim()) {
        return Err(ApiError::Invalid(format!("'{}' n'est pas une adresse email valide", email.trim())));
    }
    Ok(())
}

//

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub status: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmittedVote {
    pub id: String,
    pub user_id: String,
    pub choice: Choice,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitVoteResponse {
    #[serde(default)]
    pub status: String,
    pub vote: SubmittedVote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteUser {
    pub id: String,
    pub pseudo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    pub user: VoteUser,
    pub choice: Choice,
    pub question: String,
    pub created_at: String,
}

impl Vote {
    /// Parses `created_at`, which the backend writes either as RFC 3339 or as naive UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(v) = DateTime::parse_from_rfc3339(&self.created_at) {
            return Some(v.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|v| DateTime::<Utc>::from_naive_utc_and_offset(v, Utc))
    }
}

/// Server-computed aggregate. Percentages are whatever the server sent, integer or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteStats {
    pub oui: u64,
    pub non: u64,
    pub total: u64,
    #[serde(default)]
    pub oui_percentage: f64,
    #[serde(default)]
    pub non_percentage: f64,
}

impl VoteStats {
    pub fn empty() -> Self {
        Self {
            oui: 0,
            non: 0,
            total: 0,
            oui_percentage: 0.0,
            non_percentage: 0.0,
        }
    }

    pub fn count(&self, choice: Choice) -> u64 {
        match choice {
            Choice::Oui => self.oui,
            Choice::Non => self.non,
        }
    }

    pub fn percentage(&self, choice: Choice) -> f64 {
        match choice {
            Choice::Oui => self.oui_percentage,
            Choice::Non => self.non_percentage,
        }
    }

    /// Percentages add up to 100 (within one point of rounding) and are zero for empty choices.
    pub fn is_consistent(&self) -> bool {
        if self.total == 0 {
            return self.oui_percentage == 0.0 && self.non_percentage == 0.0;
        }

        let sum = self.oui_percentage + self.non_percentage;
        let rounded_ok = (sum - 100.0).abs() <= 1.0;
        let zero_ok = Choice::ALL
            .iter()
            .all(|c| self.count(*c) > 0 || self.percentage(*c) == 0.0);

        rounded_ok && zero_ok && self.oui + self.non <= self.total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotesPage {
    pub votes: Vec<Vote>,
    pub stats: VoteStats,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
