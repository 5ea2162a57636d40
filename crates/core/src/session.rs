//! # Session & Routes
//!
//! The contract UIs use to gate screens on sign-in state. The catalog data
//! path never depends on it.
//!
//! `LocalSessionProvider` keeps accounts in memory; hosted identity
//! providers implement [`SessionProvider`] elsewhere.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::watch;

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub uid: String,
    pub email: Option<String>,
    /// `password` or the redirect provider's name
    pub provider: String,
}

/// Sign-in failures, worded for display
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("Login method not allowed")]
    UnsupportedProvider(String),
}

const MIN_PASSWORD_LEN: usize = 6;

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError>;

    async fn register(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Sign in through a third-party provider such as `google`
    async fn sign_in_with_redirect(&self, provider: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self);

    /// Current session, updated on every sign-in and sign-out
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    fn is_authenticated(&self) -> bool {
        self.subscribe().borrow().is_some()
    }
}

/// In-memory accounts; suitable for the CLI and tests
pub struct LocalSessionProvider {
    accounts: Mutex<HashMap<String, String>>,
    redirect_providers: Vec<String>,
    current: watch::Sender<Option<Session>>,
}

impl Default for LocalSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSessionProvider {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            redirect_providers: vec!["google".to_string()],
            current,
        }
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize_email(email), password.to_string());
        self
    }

    fn publish(&self, session: Option<Session>) {
        self.current.send_replace(session);
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<String, AuthError> {
    let email = normalize_email(email);
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

fn password_session(email: String) -> Session {
    Session {
        uid: format!("local:{}", email),
        email: Some(email),
        provider: "password".to_string(),
    }
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let email = validate_email(email)?;

        let matches = self
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&email)
            .is_some_and(|stored| stored == password);
        if !matches {
            tracing::warn!(email = %email, "Email login failed");
            return Err(AuthError::InvalidCredentials);
        }

        let session = password_session(email);
        tracing::info!(uid = %session.uid, "Signed in");
        self.publish(Some(session.clone()));
        Ok(session)
    }

    async fn register(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        {
            let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            if accounts.contains_key(&email) {
                return Err(AuthError::EmailInUse);
            }
            accounts.insert(email.clone(), password.to_string());
        }

        let session = password_session(email);
        tracing::info!(uid = %session.uid, "Registered");
        self.publish(Some(session.clone()));
        Ok(session)
    }

    async fn sign_in_with_redirect(&self, provider: &str) -> Result<Session, AuthError> {
        let provider = provider.trim().to_lowercase();
        if !self.redirect_providers.contains(&provider) {
            return Err(AuthError::UnsupportedProvider(provider));
        }

        let session = Session {
            uid: format!("{}:local", provider),
            email: None,
            provider,
        };
        self.publish(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) {
        if self.current.borrow().is_none() {
            tracing::debug!("No session to sign out");
            return;
        }
        self.publish(None);
        tracing::info!("Signed out");
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }
}

/// Screens the UI can navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Pokedex,
    PokemonDetail(u32),
    Favorites,
}

impl Route {
    /// Match a path; `None` for `/` and anything unknown
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Some(Route::Login),
            ["register"] => Some(Route::Register),
            ["dashboard"] => Some(Route::Dashboard),
            ["pokedex"] => Some(Route::Pokedex),
            ["favorites"] => Some(Route::Favorites),
            ["pokemon", id] => id.parse().ok().filter(|id| *id > 0).map(Route::PokemonDetail),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Pokedex => "/pokedex".to_string(),
            Route::PokemonDetail(id) => format!("/pokemon/{}", id),
            Route::Favorites => "/favorites".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        !self.requires_guest()
    }

    pub fn requires_guest(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed(Route),
    Redirect(Route),
}

/// Decide where a navigation to `path` lands
pub fn guard(path: &str, authenticated: bool) -> Navigation {
    let Some(route) = Route::parse(path) else {
        return Navigation::Redirect(Route::Dashboard);
    };

    if route.requires_auth() && !authenticated {
        Navigation::Redirect(Route::Login)
    } else if route.requires_guest() && authenticated {
        Navigation::Redirect(Route::Dashboard)
    } else {
        Navigation::Proceed(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/login"), Some(Route::Login));
        assert_eq!(Route::parse("/pokemon/25"), Some(Route::PokemonDetail(25)));
        assert_eq!(Route::parse("/pokemon/25?tab=stats"), Some(Route::PokemonDetail(25)));
        assert_eq!(Route::parse("/favorites/"), Some(Route::Favorites));
        assert_eq!(Route::parse("/pokemon/pikachu"), None);
        assert_eq!(Route::parse("/"), None);
        assert_eq!(Route::PokemonDetail(7).path(), "/pokemon/7");
    }

    #[test]
    fn test_guard_redirects() {
        assert_eq!(guard("/pokedex", false), Navigation::Redirect(Route::Login));
        assert_eq!(guard("/pokemon/1", false), Navigation::Redirect(Route::Login));
        assert_eq!(guard("/pokedex", true), Navigation::Proceed(Route::Pokedex));
        assert_eq!(guard("/login", true), Navigation::Redirect(Route::Dashboard));
        assert_eq!(guard("/register", false), Navigation::Proceed(Route::Register));
        assert_eq!(guard("/", false), Navigation::Redirect(Route::Dashboard));
        assert_eq!(guard("/nowhere", true), Navigation::Redirect(Route::Dashboard));
    }

    #[tokio::test]
    async fn test_password_sign_in_publishes_session() {
        let provider = LocalSessionProvider::new().with_account("ash@kanto.org", "pikachu1");
        let mut sessions = provider.subscribe();
        assert!(!provider.is_authenticated());

        let err = provider.sign_in_with_password("ash@kanto.org", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
        assert_eq!(
            provider.sign_in_with_password("", "").await.unwrap_err(),
            AuthError::InvalidCredentials
        );

        let session = provider.sign_in_with_password(" Ash@Kanto.org ", "pikachu1").await.unwrap();
        assert_eq!(session.email.as_deref(), Some("ash@kanto.org"));
        assert!(sessions.has_changed().unwrap());
        assert_eq!(sessions.borrow_and_update().as_ref(), Some(&session));
        assert!(provider.is_authenticated());

        provider.sign_out().await;
        assert!(!provider.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_rules() {
        let provider = LocalSessionProvider::new().with_account("misty@kanto.org", "starmie");

        let invalid = provider.register("not-an-email", "secret12").await;
        assert_eq!(invalid, Err(AuthError::InvalidEmail));
        let weak = provider.register("brock@kanto.org", "onix").await;
        assert_eq!(weak, Err(AuthError::WeakPassword));
        let taken = provider.register("misty@kanto.org", "secret12").await;
        assert_eq!(taken, Err(AuthError::EmailInUse));

        provider.register("brock@kanto.org", "onix1234").await.unwrap();
        provider.sign_out().await;
        assert!(provider.sign_in_with_password("brock@kanto.org", "onix1234").await.is_ok());
    }

    #[tokio::test]
    async fn test_redirect_providers() {
        let provider = LocalSessionProvider::new();

        let session = provider.sign_in_with_redirect("Google").await.unwrap();
        assert_eq!(session.provider, "google");
        assert!(provider.is_authenticated());

        assert_eq!(
            provider.sign_in_with_redirect("myspace").await,
            Err(AuthError::UnsupportedProvider("myspace".to_string()))
        );
    }
}
