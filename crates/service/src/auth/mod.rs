//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Sign-up, sign-in, bearer tokens, password reset and profile updates live
//! here; the HTTP layer only maps requests onto [`AuthService`].

pub mod domain;
pub mod errors;
pub mod mailer;
pub mod repository;
pub mod service;
pub mod repo;

pub use mailer::{LogMailer, Mailer};
pub use repo::seaorm::SeaOrmAuthRepository;
pub use service::AuthService;
