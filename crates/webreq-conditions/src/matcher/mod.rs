//! Header name/value matching.
//!
//! Three layers, leaf first:
//!
//! - [`StringMatchTest`] - one prefix/suffix/equals/contains test on a string
//! - [`HeaderMatchTest`] - AND of string tests on a header's name and value
//! - [`HeaderMatcher`] - OR of header tests
//!
//! Tests built for the name position are case-insensitive and tests built
//! for the value position are case-sensitive, following HTTP's rules for
//! header names and values.

mod header_matcher;

pub use header_matcher::HeaderMatcher;
pub use header_test::{parse_test_key, HeaderMatchTest, HeaderMatcherError, HeaderPart};
pub use string_test::{MatchKind, StringMatchTest};
