//! Host-side argument values.
//!
//! An [`Argument`] is an owned byte string. It is built from whatever the
//! host hands over (`&str`, `String`, `OsString`, raw bytes) and is never
//! validated on construction: empty values, non-ASCII text and interior NUL
//! bytes are all legal here. What to do about interior NULs is decided when
//! the list is marshaled (see [`NulPolicy`](super::NulPolicy)).

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt;

/// One text value forwarded to the entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Argument(Vec<u8>);

impl Argument {
    /// Wrap raw bytes without any checks.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte length, not counting any terminator.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Offset of the first interior NUL byte, if any.
    pub fn nul_position(&self) -> Option<usize> {
        self.0.iter().position(|&b| b == 0)
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&String> for Argument {
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Vec<u8>> for Argument {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Argument {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<&Argument> for Argument {
    fn from(value: &Argument) -> Self {
        value.clone()
    }
}

#[cfg(unix)]
impl From<OsString> for Argument {
    fn from(value: OsString) -> Self {
        use std::os::unix::ffi::OsStringExt;
        Self(value.into_vec())
    }
}

#[cfg(unix)]
impl From<&OsStr> for Argument {
    fn from(value: &OsStr) -> Self {
        use std::os::unix::ffi::OsStrExt;
        Self(value.as_bytes().to_vec())
    }
}

// Windows has no byte view of OsStr; the C runtime's main receives the ANSI
// code page anyway, so lossy UTF-8 is as close as we get.
#[cfg(not(unix))]
impl From<OsString> for Argument {
    fn from(value: OsString) -> Self {
        Self::from(value.to_string_lossy().into_owned())
    }
}

#[cfg(not(unix))]
impl From<&OsStr> for Argument {
    fn from(value: &OsStr) -> Self {
        Self::from(value.to_string_lossy().into_owned())
    }
}

/// Ordered sequence of [`Argument`]s as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentList {
    args: Vec<Argument>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg: impl Into<Argument>) {
        self.args.push(arg.into());
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.args.iter()
    }

    pub fn as_slice(&self) -> &[Argument] {
        &self.args
    }
}

impl<A: Into<Argument>> FromIterator<A> for ArgumentList {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        Self {
            args: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<A: Into<Argument>> Extend<A> for ArgumentList {
    fn extend<T: IntoIterator<Item = A>>(&mut self, iter: T) {
        self.args.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for ArgumentList {
    type Item = Argument;
    type IntoIter = std::vec::IntoIter<Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArgumentList {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_mixed_sources_in_order() {
        let owned = String::from("--fields=+n");
        let mut list: ArgumentList = ["ctags", "-R"].into_iter().collect();
        list.push(&owned);
        list.push(b"raw".as_slice());
        list.extend([OsString::from("src/")]);

        let rendered: Vec<String> = list.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["ctags", "-R", "--fields=+n", "raw", "src/"]);
    }

    #[test]
    fn empty_argument_is_allowed() {
        let arg = Argument::from("");
        assert!(arg.is_empty());
        assert_eq!(arg.nul_position(), None);
    }

    #[test]
    fn nul_position_finds_first_nul() {
        let arg = Argument::from_bytes(b"a\0b\0".to_vec());
        assert_eq!(arg.nul_position(), Some(1));
    }

    #[test]
    fn non_utf8_bytes_survive() {
        let arg = Argument::from_bytes(vec![0xff, 0xfe, b'x']);
        assert_eq!(arg.as_bytes(), &[0xff, 0xfe, b'x']);
        assert_eq!(arg.len(), 3);
    }
}
