//! # Sunup Sun Times
//!
//! HTTP client for the remote sun event computation service. Implements
//! the `SunTimesService` collaborator trait; every failure is surfaced as
//! a transient service error and left to the caller's retry policy.

pub mod remote;

pub use remote::RemoteSunApi;
