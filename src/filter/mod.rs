//! Problem filters.
//!
//! A component can accept known problems by listing them in an
//! `.api_filters` document, either at the root of its archive or in the
//! `.settings` folder of its project. The [`FilterStore`] loads that document
//! on first use and answers whether a live problem is suppressed.

mod matching;
mod store;
mod xml;

pub use matching::{arguments_equal, problems_match, ProblemSignature};
pub use store::{ApiProblemFilter, FilterStore, FilteredProblem};
pub use xml::{parse_filters, read_filter_document};

/// Bucket key for problems not associated with a type.
pub const GLOBAL_KEY: &str = "!global!";

/// Filter document format version understood by this crate.
pub const CURRENT_STORE_VERSION: u32 = 2;

/// Project folder holding the filter document.
pub const SETTINGS_FOLDER: &str = ".settings";

/// File name of the filter document.
pub const FILTER_FILE_NAME: &str = ".api_filters";
