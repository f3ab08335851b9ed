//! # ampremote - Remote source for the AMP catalogue
//!
//! This crate is the network-facing adapter of the catalog engine: it
//! turns each logical query (groups, authors by handle/country/group, an
//! author's tracks, track search) into one or more HTTP requests against
//! the amp.dascene.net catalogue, parses the returned HTML pages and
//! streams the extracted entities to a caller-supplied visitor.
//!
//! The adapter is failure-only and carries no caching logic: every
//! operation either streams zero or more entities and returns normally
//! (the enumeration succeeded in full), or fails with a [`RemoteError`].
//! A failure after some entities were already streamed means the caller
//! received an incomplete subset — there is no transactionality here,
//! the caching layer above owns that concern.
//!
//! Network reachability is checked through a [`Connectivity`] policy
//! before every request; a detected-unreachable condition surfaces as
//! the same error kind as any other transport failure.

pub mod client;
pub mod connectivity;
pub mod error;
pub mod parse;
pub mod source;

pub use client::RemoteCatalog;
pub use connectivity::{AlwaysConnected, Connectivity};
pub use error::{RemoteError, Result};
pub use source::RemoteSource;
