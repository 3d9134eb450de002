//! # templater
//!
//! Fills `${key}` placeholders in a single file or in every file of a
//! directory tree. Meant for preprocessing configuration files such as
//! deployment manifests before they are applied.
//!
//! ## Features
//!
//! - Literal `${key}` substitution, no templating language
//! - Keys from the command line and from a flat `key=value` key-file
//! - Include/exclude glob filtering for directory input
//! - Output to a directory, or concatenated to stdout with a separator line
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```
//! use templater::{KeyValueMap, fill_template};
//!
//! let mut keys = KeyValueMap::new();
//! keys.insert("name".to_string(), "hello".to_string());
//!
//! assert_eq!(fill_template("name: ${name}", &keys)?, "name: hello");
//! # Ok::<(), templater::TemplaterError>(())
//! ```
//!
//! ### As a CLI Tool
//!
//! ```bash
//! # Fill a single file to stdout
//! templater deployment.yml --template-keys image=app:1.2 replicas=3
//!
//! # Fill every yaml file of a directory into out/
//! templater manifests/ --include '*.yml' --output-dir out \
//!     --template-keys-file prod.keys
//! ```

pub mod error;
pub mod filter;
pub mod fs_utils;
pub mod keys;
pub mod template;
pub mod walker;

// Re-export main types and functions for convenience
pub use error::{Result, TemplaterError};
pub use filter::FilterSpec;
pub use keys::{KeyValueMap, TemplateKeyArg, build_template_keys, keys_from_args};
pub use template::{Placeholder, fill_template, find_placeholders};
pub use walker::{DEFAULT_SEPARATOR, InputTarget, OutputTarget, WalkConfig, run};
