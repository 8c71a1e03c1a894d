//! Browser automation harness for multi-step rental application forms.
//!
//! Field references are resolved to elements by [`locator`], filled through
//! typed [`actions`], composed into steps by [`scenario`] and run as
//! [`spec`]s against any [`browser::driver::PageDriver`].

pub mod actions;
pub mod browser;
pub mod cli;
pub mod error;
pub mod fixture;
pub mod locator;
pub mod report;
pub mod scenario;
pub mod spec;
pub mod trace;
pub mod wait;
