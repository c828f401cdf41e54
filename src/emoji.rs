use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Code point ranges counted as emoji:
/// emoticons, misc symbols & pictographs, transport & map symbols,
/// dingbats, and the enclosed alphanumeric supplement (which contains the
/// regional indicator letters used for flags).
// Keep to these blocks. A single U+24C2..U+1F251 range also swallows CJK ideographs.
const EMOJI_CLASS: &str = concat!(
    r"\x{1F600}-\x{1F64F}",
    r"\x{1F300}-\x{1F5FF}",
    r"\x{1F680}-\x{1F6FF}",
    r"\x{2700}-\x{27BF}",
    r"\x{1F100}-\x{1F1FF}",
);

static SINGLE_EMOJI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("[{EMOJI_CLASS}]")).expect("emoji class is a valid regex"));

static EMOJI_RUN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("[{EMOJI_CLASS}]+")).expect("emoji class is a valid regex"));

/// How adjacent emoji are turned into counted tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EmojiPolicy {
    /// Every emoji code point is a separate token.
    #[default]
    CodePoint,
    /// A contiguous run of emoji code points is a single token.
    ContiguousRun,
}

impl EmojiPolicy {
    fn regex(self) -> &'static Regex {
        match self {
            EmojiPolicy::CodePoint => &SINGLE_EMOJI_REGEX,
            EmojiPolicy::ContiguousRun => &EMOJI_RUN_REGEX,
        }
    }
}

pub fn is_emoji(c: char) -> bool {
    let mut buf = [0u8; 4];
    SINGLE_EMOJI_REGEX.is_match(c.encode_utf8(&mut buf))
}

/// Emoji tokens of `text` in order of appearance. Non-emoji text is ignored.
pub fn emoji_tokens(text: &str, policy: EmojiPolicy) -> impl Iterator<Item = &str> {
    policy.regex().find_iter(text).map(|m| m.as_str())
}
