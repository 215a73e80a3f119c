//! Page-level flows: what each form submit or guarded page does with the
//! account store and where the user goes next.

use crate::auth::{AuthManager, User};
use crate::forms::{ContactForm, LoginForm, SignupForm};
use std::fmt;
use tracing::debug;

/// Banner colour class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Danger,
}

impl BannerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

/// Dismissible message shown above a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: BannerKind::Success, message: message.into() }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self { kind: BannerKind::Danger, message: message.into() }
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

/// Pages of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Index,
    Login,
    Main,
    About,
    Contact,
}

impl View {
    pub fn path(self) -> &'static str {
        match self {
            Self::Index => "index.html",
            Self::Login => "login.html",
            Self::Main => "main.html",
            Self::About => "about.html",
            Self::Contact => "contact.html",
        }
    }

    /// Pages that need a logged-in user
    pub fn is_protected(self) -> bool {
        matches!(self, Self::Main | Self::About | Self::Contact)
    }
}

/// Result of a page action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub banner: Option<Banner>,
    pub redirect: Option<View>,
}

impl Outcome {
    fn stay(banner: Banner) -> Self {
        Self { banner: Some(banner), redirect: None }
    }

    fn go(banner: Option<Banner>, view: View) -> Self {
        Self { banner, redirect: Some(view) }
    }
}

/// Login form submit
pub fn submit_login(auth: &AuthManager, form: &LoginForm) -> Outcome {
    let (email, password) = match form.validate() {
        Ok(fields) => fields,
        Err(message) => return Outcome::stay(Banner::danger(message)),
    };

    let result = auth.login(&email, &password);
    if result.success {
        Outcome::go(Some(Banner::success(result.message)), View::Main)
    } else {
        Outcome::stay(Banner::danger(result.message))
    }
}

/// Signup form submit
pub fn submit_signup(auth: &AuthManager, form: &SignupForm, min_password_length: usize) -> Outcome {
    let request = match form.validate(min_password_length) {
        Ok(request) => request,
        Err(message) => return Outcome::stay(Banner::danger(message)),
    };

    let result = auth.register(request);
    if result.success {
        let message = format!("{} Redirecting to login...", result.message);
        Outcome::go(Some(Banner::success(message)), View::Login)
    } else {
        Outcome::stay(Banner::danger(result.message))
    }
}

/// Gate for protected pages: the session user, or where to send the visitor
pub fn require_auth(auth: &AuthManager, view: View) -> Result<Option<User>, View> {
    if !view.is_protected() {
        return Ok(auth.current_user());
    }

    match auth.current_user() {
        Some(user) => Ok(Some(user)),
        None => {
            debug!("No session for {}, redirecting to login", view.path());
            Err(View::Login)
        }
    }
}

pub fn welcome(user: &User) -> String {
    format!("Welcome, {}!", user.first_name)
}

pub fn profile_summary(user: &User) -> String {
    format!(
        "Profile for {} {}\nEmail: {}\nPhone: {}",
        user.first_name, user.last_name, user.email, user.phone
    )
}

/// Logout control: the session goes away and the login page follows
pub fn logout(auth: &AuthManager) -> Outcome {
    auth.logout();
    Outcome::go(None, View::Login)
}

/// Fill empty contact fields from the session user
pub fn contact_prefill(auth: &AuthManager, form: &mut ContactForm) {
    let Some(user) = auth.current_user() else {
        return;
    };

    if form.name.is_empty() {
        form.name = user.full_name();
    }

    if form.email.is_empty() {
        form.email = user.email;
    }
}

/// Contact form submit. A successful submit resets the form.
pub fn submit_contact(form: &mut ContactForm) -> Outcome {
    match form.validate() {
        Ok(message) => {
            *form = ContactForm::default();
            Outcome::stay(Banner::success(message))
        }
        Err(message) => Outcome::stay(Banner::danger(message)),
    }
}

/// Debug action wiping every stored key
pub fn clear_all_data(auth: &AuthManager) -> Outcome {
    if auth.clear_all() {
        Outcome::go(
            Some(Banner::success("All data cleared. You will be redirected to the login page.")),
            View::Index,
        )
    } else {
        Outcome::stay(Banner::danger("Error clearing stored data."))
    }
}
