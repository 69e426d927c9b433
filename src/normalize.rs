// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Text normalization applied to raw posts before any modeling.
//!
//! `normalize` is pure, total, and idempotent. Transformations run in a fixed
//! order: `@handle` mentions, then `#` marks (the word is kept), then leading
//! retweet markers, then URLs.

use std::sync::LazyLock;

use regex::Regex;

static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+").unwrap());
static HASH_MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#").unwrap());
static RETWEET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:RT\s+)+").unwrap());
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Clean a raw post for modeling.
pub fn normalize(text: &str) -> String {
    let text = MENTION.replace_all(text, "");
    let text = HASH_MARK.replace_all(&text, "");
    let text = RETWEET.replace(&text, "");
    let text = URL.replace_all(&text, "");
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_mentions() {
        assert_eq!(normalize("thanks @nhs_uk for the jab"), "thanks  for the jab");
        assert_eq!(normalize("@a @b hello"), "  hello");
    }

    #[test]
    fn test_strips_hash_marks_keeps_word() {
        assert_eq!(normalize("#vaccine rollout"), "vaccine rollout");
        assert_eq!(normalize("go #team #now"), "go team now");
    }

    #[test]
    fn test_strips_leading_retweet_marker() {
        assert_eq!(normalize("RT appointment booked"), "appointment booked");
        assert_eq!(normalize("RT RT doubly shared"), "doubly shared");
        // only a leading marker is a retweet marker
        assert_eq!(normalize("SUPPORT staff"), "SUPPORT staff");
        assert_eq!(normalize("no RT here"), "no RT here");
    }

    #[test]
    fn test_strips_urls() {
        assert_eq!(normalize("read https://example.com/a?b=c now"), "read  now");
        assert_eq!(normalize("http://t.co/xyz"), "");
    }

    #[test]
    fn test_order_and_combination() {
        let raw = "RT @who: #covid vaccine news https://t.co/abc123";
        assert_eq!(normalize(raw), ": covid vaccine news ");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "RT @user #tag text https://example.org",
            "plain text with nothing to strip",
            "",
            "@@double #hash# RT",
        ];
        for raw in inputs {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }
}
