//! `xiaoxian-survey` - Player questionnaire and dashboard for 啸仙丹心
//!
//! This library collects game experience questionnaires, keeps every
//! submission in a local `SQLite` slot, and reduces the collection to the
//! statistics shown on the dashboard.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod mock;
pub mod questionnaire;
pub mod report;
pub mod response;
pub mod share;
pub mod stats;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{FormSession, ResponseDraft};
pub use logging::init_logging;
pub use response::{ScaleField, ScaleRating, SurveyAnswers, SurveyResponse};
pub use share::ShareLink;
pub use stats::Dashboard;
pub use storage::{Storage, StorageStats};
pub use store::{ResponseStore, StoreStatus};
