use std::sync::Arc;

use evlog::meta;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::transport::{HttpTransport, Method, Request, Transport};
use crate::api::types::{
    CreateUserRequest, LoginRequest, SubmitVoteRequest, SubmitVoteResponse, SubmittedVote, User,
    UserResponse, VotesPage,
};
use crate::config::Config;
use crate::runtime::get_logger;

pub const USER_PATH: &str = "/user";
pub const LOGIN_PATH: &str = "/login";
pub const VOTE_PATH: &str = "/vote";
pub const VOTES_PATH: &str = "/votes";

/// Client for the Bayrou Meter HTTP API.
///
/// Cheap to clone; every clone shares the same transport.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let transport = HttpTransport::new(&config.api_url, config.request_timeout)?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> ApiResult<User> {
        request.validate()?;

        let r: UserResponse = self.request(Method::Post, USER_PATH, Some(to_body(request)?)).await?;

        get_logger().info("User created.", meta![
            "UserID" => r.user.id.clone(),
            "Pseudo" => r.user.pseudo.clone(),
        ]);

        Ok(r.user)
    }

    pub async fn login_user(&self, request: &LoginRequest) -> ApiResult<User> {
        request.validate()?;

        let r: UserResponse = self.request(Method::Post, LOGIN_PATH, Some(to_body(request)?)).await?;

        get_logger().info("User logged in.", meta![
            "UserID" => r.user.id.clone(),
            "Pseudo" => r.user.pseudo.clone(),
        ]);

        Ok(r.user)
    }

    pub async fn submit_vote(&self, request: &SubmitVoteRequest) -> ApiResult<SubmittedVote> {
        request.validate()?;

        let r: SubmitVoteResponse = self.request(Method::Post, VOTE_PATH, Some(to_body(request)?)).await?;

        get_logger().info("Vote submitted.", meta![
            "VoteID" => r.vote.id.clone(),
            "UserID" => r.vote.user_id.clone(),
            "Choice" => r.vote.choice,
        ]);

        Ok(r.vote)
    }

    pub async fn list_votes(&self) -> ApiResult<VotesPage> {
        self.request(Method::Get, VOTES_PATH, None).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &'static str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<T> {
        let response = match self.transport.send(Request { method, path, body }).await {
            Ok(v) => v,
            Err(e) => {
                get_logger().info("Request did not reach the API.", meta![
                    "Method" => method,
                    "Path" => path,
                    "Error" => e.to_string(),
                ]);
                return Err(ApiError::Transport(e));
            }
        };

        get_logger().debug("API responded.", meta![
            "Method" => method,
            "Path" => path,
            "Status" => response.status,
        ]);

        if !response.is_success() {
            let err = ApiError::from_response(response.status, &response.body);
            get_logger().info("API returned an error.", meta![
                "Method" => method,
                "Path" => path,
                "Status" => response.status,
                "Error" => err.to_string(),
            ]);
            return Err(err);
        }

        match serde_json::from_slice(&response.body) {
            Ok(v) => Ok(v),
            Err(e) => {
                get_logger().info("API response body could not be decoded.", meta![
                    "Method" => method,
                    "Path" => path,
                    "Error" => e.to_string(),
                ]);
                Err(ApiError::MalformedBody(e))
            }
        }
    }
}

fn to_body<T: Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(ApiError::MalformedBody)
}
