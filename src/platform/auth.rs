//! Interactive authentication state machine for the message-stream session
//!
//! Sign-in is a three-step challenge: phone number, one-time code, and an
//! optional two-factor password. The machine has named states and explicit
//! transition methods, decoupled from whatever UI collects the answers. Any
//! step may fail and leave the machine where it was for a retry, except an
//! invalid phone number, which resets to [`AuthState::Unauthenticated`].

use crate::platform::stream::{SignIn, StreamMessage, StreamTransport, TransportError};
use thiserror::Error;

/// States of the sign-in challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    AwaitingCode,
    AwaitingTwoFactor,
    Authenticated,
}

/// Authentication failures surfaced to the caller
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required before fetching from the message stream")]
    AuthenticationRequired,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Invalid login code")]
    InvalidCode,

    #[error("Invalid two-factor password")]
    InvalidPassword,

    #[error("Step not valid in state {0:?}")]
    WrongState(AuthState),

    #[error("Transport failure during authentication: {0}")]
    Transport(String),
}

/// The process-wide message-stream session
///
/// Owns the transport and the auth state machine. Created on first need,
/// reused for the remainder of the process lifetime, torn down at exit.
pub struct StreamSession {
    transport: Box<dyn StreamTransport>,
    state: AuthState,
    phone: Option<String>,
}

impl StreamSession {
    pub fn new(transport: Box<dyn StreamTransport>) -> Self {
        Self {
            transport,
            state: AuthState::Unauthenticated,
            phone: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// Submits the phone number; on success the machine awaits the code
    ///
    /// An invalid phone number resets the machine to `Unauthenticated`;
    /// any other failure keeps the current state for a retry.
    pub async fn submit_phone(&mut self, phone: &str) -> Result<AuthState, AuthError> {
        if self.state != AuthState::Unauthenticated {
            return Err(AuthError::WrongState(self.state));
        }

        match self.transport.send_login_code(phone).await {
            Ok(()) => {
                self.phone = Some(phone.to_string());
                self.state = AuthState::AwaitingCode;
                Ok(self.state)
            }
            Err(TransportError::InvalidPhone) => {
                self.phone = None;
                self.state = AuthState::Unauthenticated;
                Err(AuthError::InvalidPhone)
            }
            Err(e) => Err(AuthError::Transport(e.to_string())),
        }
    }

    /// Submits the one-time code
    ///
    /// Moves to `Authenticated`, or to `AwaitingTwoFactor` when the account
    /// has a secondary password. A wrong code keeps the machine awaiting a
    /// code.
    pub async fn submit_code(&mut self, code: &str) -> Result<AuthState, AuthError> {
        if self.state != AuthState::AwaitingCode {
            return Err(AuthError::WrongState(self.state));
        }
        let phone = self.phone.clone().unwrap_or_default();

        match self.transport.sign_in(&phone, code).await {
            Ok(SignIn::Authorized) => {
                self.state = AuthState::Authenticated;
                Ok(self.state)
            }
            Ok(SignIn::PasswordNeeded) => {
                self.state = AuthState::AwaitingTwoFactor;
                Ok(self.state)
            }
            Err(TransportError::InvalidCode) => Err(AuthError::InvalidCode),
            Err(e) => Err(AuthError::Transport(e.to_string())),
        }
    }

    /// Submits the two-factor password; on success the session is authorized
    pub async fn submit_password(&mut self, password: &str) -> Result<AuthState, AuthError> {
        if self.state != AuthState::AwaitingTwoFactor {
            return Err(AuthError::WrongState(self.state));
        }

        match self.transport.check_password(password).await {
            Ok(()) => {
                self.state = AuthState::Authenticated;
                Ok(self.state)
            }
            Err(TransportError::InvalidPassword) => Err(AuthError::InvalidPassword),
            Err(e) => Err(AuthError::Transport(e.to_string())),
        }
    }

    /// Fetches one page of channel history through the authenticated session
    pub(crate) async fn history_page(
        &mut self,
        channel: &str,
        offset_id: i64,
        limit: u32,
    ) -> Result<Vec<StreamMessage>, TransportError> {
        if self.state != AuthState::Authenticated {
            return Err(TransportError::Unauthorized);
        }
        self.transport.history_page(channel, offset_id, limit).await
    }
}
