//! Data model for API analysis.
//!
//! Components and profiles hold immutable [`TypeStructure`]s loaded from
//! binary class representations (or JSON snapshots of them). Problems found
//! by a build are described by [`ProblemRecord`]s.
//!
//! ```ignore
//! let profile: Profile = serde_json::from_str::<ProfileSnapshot>(&json)?.into();
//! let handle = profile.find_type("org.example.core", "org.example.api.Widget")?;
//! ```

mod classfile;
mod component;
mod problem;
mod types;
mod version;

pub use classfile::{read_class_name, ClassArtifactReader, ClassFileReader};
pub use component::*;
pub use problem::*;
pub use types::*;
pub use version::*;
