use tracing::{error, info};

use crate::api::{ApiClient, ApiError};

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Login form: exchanges credentials for tokens and starts the session.
pub struct LoginScreen {
    api: ApiClient,
    pub username: String,
    pub password: String,
    pub error: Option<String>,
}

impl LoginScreen {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            username: String::new(),
            password: String::new(),
            error: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Attempt login with the credentials from the form.
    ///
    /// On success the tokens are persisted through the session and the
    /// password is cleared. On failure `error` holds a message for the user.
    pub async fn submit(&mut self) -> bool {
        if let Err(message) = self.validate() {
            self.error = Some(message.to_string());
            return false;
        }
        self.error = None;

        let result = async {
            let tokens = self.api.obtain_tokens(&self.username, &self.password).await?;
            self.api.session().login(&tokens.access, &tokens.refresh)?;
            Ok::<_, ApiError>(())
        }
        .await;

        match result {
            Ok(()) => {
                self.password.clear();
                info!(username = %self.username, "Login successful");
                true
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.error = Some(Self::user_message(&e));
                false
            }
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err("Username and password required");
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err("Username is too long");
        }
        if self.password.chars().count() > MAX_PASSWORD_LENGTH {
            return Err("Password is too long");
        }
        if username.chars().any(char::is_control) {
            return Err("Username contains invalid characters");
        }
        Ok(())
    }

    /// Provide user-friendly error messages based on error type
    fn user_message(error: &ApiError) -> String {
        match error {
            ApiError::AuthRejected { .. } => "Invalid username or password".to_string(),
            ApiError::Network(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Network(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::Storage(_) => "Could not save the session on this device".to_string(),
            other => format!("Login failed: {}", other),
        }
    }
}
