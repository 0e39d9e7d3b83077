//! An Adaptive Radix Tree: an ordered map from byte strings to values.
//!
//! Inner nodes come in four size classes holding up to 4, 16, 48 or 256 children, and are
//! promoted or demoted as entries come and go. Runs of single-child nodes are folded into a
//! compressed prefix of up to [`MAX_PREFIX_LEN`](partials::MAX_PREFIX_LEN) stored bytes; longer
//! prefixes keep their exact length and read the remaining bytes back from a leaf when needed.
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use artree::AdaptiveRadixTree;
//!
//! let mut tree = AdaptiveRadixTree::new();
//! tree.insert("foo", 1);
//! tree.insert("foobar", 2);
//! tree.insert("foobaz", 3);
//! tree.insert("bar", 4);
//!
//! assert_eq!(tree.get("foo"), Some(&1));
//! assert_eq!(tree.remove("bar"), Some(4));
//!
//! let mut seen = vec![];
//! let _ = tree.walk_prefix("foob", |key, value| {
//!     seen.push((key.to_vec(), *value));
//!     ControlFlow::<()>::Continue(())
//! });
//! assert_eq!(seen, vec![(b"foobar".to_vec(), 2), (b"foobaz".to_vec(), 3)]);
//!
//! let snapshot = tree.copy();
//! tree.insert("foo", 10);
//! assert_eq!(snapshot.get("foo"), Some(&1));
//! ```
//!
//! # Features
//!
//! - `simd_keys` (default): SSE2 key search in 16-wide nodes on x86 and x86_64.
//! - `tracing`: emit node promotion, demotion, split and collapse events through `tracing`.

#[macro_use]
mod tracing_helpers;

pub mod error;
pub mod iter;
pub mod mapping;
mod node;
pub mod partials;
pub mod stats;
pub mod tree;
pub mod utils;

pub use crate::error::ArtError;
pub use crate::iter::Iter;
pub use crate::stats::{TreeStats, TreeStatsTrait};
pub use crate::tree::{AdaptiveRadixTree, MAX_KEY_LEN};
