//! # gistsel
//!
//! `gistsel` turns a gist listing into selectable rows, keeps a local git mirror of
//! every gist, and runs or edits the mirrored files.
//!
//! The pipeline is: [`RemoteClient`] lists raw records, [`convert_items`] turns them
//! into [`Items`] with derived URLs and mirror paths, [`Items::unique`],
//! [`Items::filter`] and [`Items::render`] prepare the lines for a fuzzy finder
//! ([`Selector`]), and the picked [`Row`]s are synced with [`Mirror`] and run with
//! [`Runner`].
//!
//! # Features
//!
//! - `parallel`: Clones mirrors concurrently using Rayon.
//! - `logging`: Enables debug logging via the `tracing` crate.
//!
//! # Example
//!
//! ```no_run
//! use gistsel::{ConfigBuilder, Mirror, RawItem, RawFile, convert_items};
//!
//! let config = ConfigBuilder::new("/tmp/gists").build();
//! let settings = config.settings().expect("invalid base URL");
//! let raw = vec![RawItem {
//!     id: "0123456789abcdef".into(),
//!     public: true,
//!     files: vec![RawFile { filename: "hello.sh".into(), content: "echo hi".into() }],
//!     ..Default::default()
//! }];
//! let items = convert_items(raw, &settings).expect("conversion failed").unique();
//!
//! for line in items.render(&config.screen.columns) {
//!     println!("{}", line);
//! }
//! for outcome in Mirror::new().clone_all(&items) {
//!     if let Err(e) = outcome.result {
//!         eprintln!("{}: {}", outcome.id, e);
//!     }
//! }
//! ```

mod cache;
mod collection;
mod convert;
mod error;
mod mirror;
mod options;
mod remote;
mod render;
mod runner;
mod screen;
mod selector;
mod types;

pub use cache::Cache;
pub use convert::{ID_LENGTH, convert_item, convert_items, item_url, shorten_id};
pub use error::GistError;
pub use mirror::{CloneOutcome, CloneStatus, Fetcher, GitFetcher, Mirror, MirrorOptions};
pub use options::{
    Config, ConfigBuilder, CoreConfig, FlagConfig, GistConfig, ScreenConfig, Settings,
    default_config_path, default_dir,
};
pub use remote::{ListKind, RemoteClient};
pub use runner::{EXEC_MODE, OsPermissions, PermissionOps, Runner, is_runnable};
pub use screen::{Screen, load_raw};
pub use selector::Selector;
pub use types::{File, Files, Item, Items, RawFile, RawItem, Row};
