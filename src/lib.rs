//! # Enirejo (Conference Platform Edge Auth Gateway)
//!
//! `enirejo` is a small HTTP service that sits in front of the conference
//! platform web application and decides, per request, whether a page may be
//! served, must detour through verification, or should present sign-in.
//!
//! ## Route policy
//!
//! The platform exposes two role-scoped dashboard namespaces, `/organizer/*`
//! and `/attendee/*`. Requests into those namespaces are gated at the edge by
//! a cheap cookie-presence check (the *auth signal*): if a recognized identity
//! cookie is present the request passes through optimistically, otherwise the
//! browser is redirected to the verification page (`/auth/check`) carrying the
//! originally requested path as `?redirect=`.
//!
//! ## Verification
//!
//! The verification page is the authoritative step. It waits for the identity
//! service to settle into a terminal state, resolves the user's role, and
//! issues exactly one redirect: to the role's own dashboard when the requested
//! path belongs to the other role, to the requested path when it matches, or
//! to sign-in when no session exists.
//!
//! The cookie check is an optimization, never a security boundary; protected
//! data is still authorized by the backing APIs independently of this gateway.
//!
//! ## Identity service
//!
//! Sessions and role attributes live in an external identity service reached
//! over HTTP. This gateway only reads its state and never mutates it, so every
//! gating decision is safe to recompute.

pub mod api;
pub mod check;
pub mod cli;
pub mod guard;
pub mod identity;
pub mod provider;
pub mod routes;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
