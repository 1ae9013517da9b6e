//! vizij-path-core: dotted/indexed property paths over JSON trees
//!
//! Shared by the template engine (path lookups inside `%{...}` tokens) and by
//! callers that normalize flat patch updates (`"marker.line.width": 2`) into
//! nested configuration before merging it into a live tree.

pub mod accessor;
pub mod expand;
pub mod merge;
pub mod path;

pub use accessor::{JsonAccessor, PropertyAccessor};
pub use expand::{expand_object_paths, expand_object_paths_in_place, object_from_path};
pub use merge::extend_deep_no_arrays;
pub use path::{is_simple_key, PathKey, PathSegment, PropertyPath, MAX_INDEX};
