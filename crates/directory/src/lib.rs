//! Recipient directories for Herald.
//!
//! A [`DirectoryProvider`] yields the ordered recipient list the operator
//! chooses from. [`SheetsDirectory`] reads a published Google Sheets tab via
//! its gviz JSON export; [`StaticDirectory`] serves a fixed list. Both run the
//! rows through the same [`DirectoryPolicy`] (header/marker filtering,
//! deduplication, sorting).

pub mod error;
pub mod gviz;
pub mod policy;
pub mod provider;
pub mod sheets;
pub mod static_list;

pub use error::DirectoryError;
pub use policy::{DirectoryPolicy, RawRow};
pub use provider::DirectoryProvider;
pub use sheets::{SheetsConfig, SheetsDirectory};
pub use static_list::StaticDirectory;
