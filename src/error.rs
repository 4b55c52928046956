pub type Result<T> = ::core::result::Result<T, Error>;

/// Stable, wire-level error codes. The numeric values match the public
/// surface's `{0 | INSUFFICIENT_CAPACITY | ...}` return codes; the
/// distinction between `InvalidStack` and `InvalidProof` is diagnostic
/// only, both mean "this proof does not verify".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Error {
    /// `state_insert` had no room to append and no existing entry to
    /// overwrite.
    InsufficientCapacity = 80,
    /// `state_fetch` found no entry for the given key.
    NotFound = 81,
    /// The proof VM's stack over/underflowed, or didn't reduce to exactly
    /// one entry by the time the proof bytes were exhausted.
    InvalidStack = 82,
    /// Reserved for forward compatibility; never constructed.
    InvalidSibling = 83,
    /// The proof is malformed, truncated, or does not reduce to the
    /// claimed root.
    InvalidProof = 84,
}

impl Error {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::InsufficientCapacity => "insufficient capacity",
            Error::NotFound => "key not found",
            Error::InvalidStack => "invalid stack",
            Error::InvalidSibling => "invalid sibling",
            Error::InvalidProof => "invalid proof",
        };
        write!(f, "{} (code {})", msg, self.code())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
