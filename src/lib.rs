//! dyntree: navigate and edit JSON documents by path.
//!
//! A parsed document lives in an arena of nodes. [`Container`] handles point
//! at single nodes and expose search, set, delete and array operations.
//! A path that crosses an array fans out over every element:
//!
//! ```
//! use dyntree::Container;
//! use serde_json::json;
//!
//! let doc = Container::consume(json!({"a": [{"b": 1}, {"b": 2}, {"c": 3}]}));
//! assert_eq!(doc.path("a.b").unwrap().data(), json!([1, 2]));
//!
//! doc.set_p(json!("x"), "d.e").unwrap();
//! assert!(doc.exists_p("d.e"));
//! ```

pub mod arena;
pub mod cli;
pub mod codec;
pub mod config;
pub mod container;
pub mod errors;
pub mod exitcode;
pub mod path;
pub mod tree_traits;
pub mod util;

pub use arena::JsonKind;
pub use codec::{parse_json, parse_json_file, write_json_file};
pub use container::Container;
pub use errors::{TreeError, TreeResult};
pub use path::{split_path, DEFAULT_SEPARATOR};
pub use serde_json::Value;
pub use tree_traits::TreeNodeConvert;
