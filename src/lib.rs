//! H5P Forge · prompt → H5P MultiChoice package
//!
//! - `content`: builds the MultiChoice `content.json` object
//! - `splice`: replaces `content/content.json` inside a template `.h5p` archive
//! - `openai`: asks a chat model for one question as strict JSON
//! - `routes`: axum HTTP API + static form page

pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod logic;
pub mod openai;
pub mod protocol;
pub mod routes;
pub mod splice;
pub mod state;
pub mod telemetry;
pub mod util;

pub use content::ContentBuilder;
pub use error::{Error, Result};
pub use splice::{replace_entry, splice_content, CONTENT_ENTRY};
pub use state::AppState;
