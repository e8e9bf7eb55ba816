//! Email lookup-value helpers.
//!
//! Every stored user carries a secondary lookup value combining its email
//! with the creation date. Lexicographic prefix search over this value
//! implements both the exact-email existence check and the list filter, so
//! the helpers live here where every backend and the handlers share them.

use chrono::NaiveDate;

/// The secondary lookup value for a user.
///
/// Pattern: `<email>#<YYYY-MM-DD>` (creation date, date-only)
pub fn email_lookup_value(email: &str, created: NaiveDate) -> String {
    format!("{email}#{}", created.format("%Y-%m-%d"))
}

/// The prefix matching exactly one email value.
///
/// The trailing `#` stops `a@b.com` from also matching `a@b.com.au`.
pub fn email_exact_prefix(email: &str) -> String {
    format!("{email}#")
}
