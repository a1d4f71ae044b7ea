//! Pipeline stages for the CV import flow.
//!
//! Each submodule implements exactly one stage. Keeping stages separate
//! makes each independently testable against a scripted backend and keeps
//! the orchestration in [`crate::import`] free of wire details.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ upload ──▶ trigger ──▶ poll ──▶ reconcile ──▶ review
//! (local)     (base64)   (parse)    (status)  (field names)  (publish)
//! ```
//!
//! 1. [`validate`] — reject bad files and too-short pasted text before any
//!    network call
//! 2. [`upload`]   — base64-encode and submit the document; classify
//!    extraction failures for the paste-text fallback
//! 3. [`poll`]     — drive the asynchronous parse job to a terminal state
//!    on a fixed interval with a bounded attempt budget

pub mod poll;
pub mod upload;
pub mod validate;
