//! HTTP methods as bit flags.
//!
//! The trie keys handlers by method *flag* rather than by name so a single
//! node can hold its whole method map in a fixed array, and so one
//! registration can cover several methods at once (`GET | HEAD`, or the
//! `"ALL"` sentinel).

use bitflags::bitflags;

use crate::error::Error;

bitflags! {
    /// A set of HTTP methods.
    ///
    /// Each of the nine RFC 9110 methods owns one bit. [`MethodFlags::ALL`]
    /// is the union of all nine; it is accepted at registration time (it
    /// fans out into the concrete slots) but is never stored as a lookup key.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MethodFlags: u16 {
        const CONNECT = 1 << 0;
        const DELETE  = 1 << 1;
        const GET     = 1 << 2;
        const HEAD    = 1 << 3;
        const OPTIONS = 1 << 4;
        const PATCH   = 1 << 5;
        const POST    = 1 << 6;
        const PUT     = 1 << 7;
        const TRACE   = 1 << 8;

        const ALL = Self::CONNECT.bits() | Self::DELETE.bits() | Self::GET.bits()
                  | Self::HEAD.bits() | Self::OPTIONS.bits() | Self::PATCH.bits()
                  | Self::POST.bits() | Self::PUT.bits() | Self::TRACE.bits();
    }
}

/// Number of concrete methods, and the width of a node's handler array.
pub(crate) const METHOD_COUNT: usize = 9;

/// Wire names indexed by flag bit position.
const METHOD_NAMES: [&str; METHOD_COUNT] = [
    "CONNECT", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT", "TRACE",
];

impl MethodFlags {
    /// Parses an uppercase method name. Recognizes the nine RFC 9110 methods
    /// plus the `"ALL"` registration sentinel. Distinct from the
    /// bitflags-generated `from_name`, which works on flag identifiers.
    pub fn from_method_name(name: &str) -> Result<Self, Error> {
        match name {
            "CONNECT" => Ok(Self::CONNECT),
            "DELETE"  => Ok(Self::DELETE),
            "GET"     => Ok(Self::GET),
            "HEAD"    => Ok(Self::HEAD),
            "OPTIONS" => Ok(Self::OPTIONS),
            "PATCH"   => Ok(Self::PATCH),
            "POST"    => Ok(Self::POST),
            "PUT"     => Ok(Self::PUT),
            "TRACE"   => Ok(Self::TRACE),
            "ALL"     => Ok(Self::ALL),
            _         => Err(Error::UnknownMethod(name.to_owned())),
        }
    }

    /// The wire name of a single-method flag.
    pub fn name(self) -> &'static str {
        METHOD_NAMES[self.slot()]
    }

    /// Handler-array slot for a single-method flag.
    pub(crate) fn slot(self) -> usize {
        debug_assert_eq!(self.bits().count_ones(), 1, "slot() takes a single flag");
        self.bits().trailing_zeros() as usize
    }

    /// Renders the set as an `Allow` header value, e.g. `"GET, POST"`.
    pub fn allow_header(self) -> String {
        self.iter()
            .map(MethodFlags::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
