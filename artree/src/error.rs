use std::fmt as StdFmt;

/// Errors returned by [`AdaptiveRadixTree::try_insert`](crate::tree::AdaptiveRadixTree::try_insert).
///
/// Either way the tree is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtError {
    /// The buffer for the new leaf's key could not be allocated.
    AllocationFailed { bytes: usize },

    /// Keys are limited to [`MAX_KEY_LEN`](crate::tree::MAX_KEY_LEN) bytes.
    KeyTooLong { len: usize },
}

impl StdFmt::Display for ArtError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::AllocationFailed { bytes } => {
                write!(f, "memory allocation of {bytes} bytes for leaf key failed")
            }
            Self::KeyTooLong { len } => write!(
                f,
                "key of {len} bytes exceeds the maximum key length of {} bytes",
                crate::tree::MAX_KEY_LEN
            ),
        }
    }
}

impl std::error::Error for ArtError {}
