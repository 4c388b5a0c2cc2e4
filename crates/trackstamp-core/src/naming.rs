//! Project slugs, titles, time tokens, and artifact filename templates.

use chrono::Timelike;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{WorkflowError, WorkflowResult};

/// Pattern for a time token: `HHMM` followed by `A` or `P`.
const TIME_TOKEN_PATTERN: &str = r"^[0-9]{4}[AP]$";

static TIME_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn time_token_regex() -> &'static Regex {
    TIME_TOKEN_REGEX.get_or_init(|| Regex::new(TIME_TOKEN_PATTERN).expect("invalid regex pattern"))
}

/// Human title for a project directory name.
///
/// Underscores become spaces and the first letter of each word is
/// uppercased; the rest of each word is kept as-is so acronyms survive.
pub fn title_from_name(dirname: &str) -> String {
    dirname
        .replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filename prefix for a project directory name: the name uppercased.
pub fn slug_from_name(dirname: &str) -> String {
    dirname.to_uppercase()
}

/// True when `token` is exactly four ASCII digits followed by `A` or `P`.
pub fn validate_suffix(token: &str) -> bool {
    time_token_regex().is_match(token)
}

/// Formats a time of day as a 12-hour `HHMM` + `A|P` token.
pub fn format_suffix<T: Timelike>(time: &T) -> String {
    let (pm, hour) = time.hour12();
    format!(
        "{:02}{:02}{}",
        hour,
        time.minute(),
        if pm { 'P' } else { 'A' }
    )
}

/// Token for the current local time.
pub fn format_now_suffix() -> String {
    format_suffix(&chrono::Local::now())
}

/// A validated `HHMMA|P` time token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeToken(String);

impl TimeToken {
    /// Parses a token supplied as the artifact suffix.
    pub fn parse(token: &str) -> WorkflowResult<Self> {
        Self::parse_labeled(token, "suffix")
    }

    /// Parses a token, naming it `label` (e.g. `from`, `to`) in the error.
    pub fn parse_labeled(token: &str, label: &'static str) -> WorkflowResult<Self> {
        if validate_suffix(token) {
            Ok(Self(token.to_string()))
        } else {
            Err(WorkflowError::InvalidTimeToken {
                label,
                token: token.to_string(),
            })
        }
    }

    /// Token for the current local time.
    pub fn now() -> Self {
        Self(format_now_suffix())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which lifecycle artifact a filename is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind<'a> {
    /// Save-state, lossless bounce, or compressed bounce of a savepoint.
    Savepoint { token: &'a TimeToken },
    /// Stem from the primary session tool.
    Stem { token: &'a TimeToken, part: &'a str },
    /// Stem from the secondary session tool, spanning two tokens.
    SessionStem {
        from: &'a TimeToken,
        to: &'a TimeToken,
        part: &'a str,
    },
    /// Pre-mastering print.
    Unmastered {
        from: &'a TimeToken,
        to: &'a TimeToken,
    },
    /// Numbered mastering candidate.
    NumberedMaster {
        from: &'a TimeToken,
        to: &'a TimeToken,
        version: u32,
    },
    /// Promoted final master.
    FinalMaster {
        from: &'a TimeToken,
        to: &'a TimeToken,
    },
}

impl ArtifactKind<'_> {
    /// Every convention as `(key, template)`, for documentation and metadata.
    pub fn conventions() -> [(&'static str, &'static str); 6] {
        [
            ("savepoint", "{slug}-{token}.{ext}"),
            ("stem", "{slug}-{token}-{PART}.{ext}"),
            ("session_stem", "{slug}-{from}-{to}-{PART}.{ext}"),
            ("unmastered", "{slug}-{from}-{to}-[unmastered].{ext}"),
            ("numbered_master", "{slug}-{from}-{to}-{n}.{ext}"),
            ("final_master", "{slug}-{from}-{to}-FINAL.{ext}"),
        ]
    }
}

/// A filename built from a project slug and an [`ArtifactKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactName<'a> {
    slug: &'a str,
    kind: ArtifactKind<'a>,
}

impl<'a> ArtifactName<'a> {
    pub fn new(slug: &'a str, kind: ArtifactKind<'a>) -> Self {
        Self { slug, kind }
    }

    /// Filename stem, without extension.
    pub fn stem(&self) -> String {
        let slug = self.slug;
        match self.kind {
            ArtifactKind::Savepoint { token } => format!("{slug}-{token}"),
            ArtifactKind::Stem { token, part } => format!("{slug}-{token}-{part}"),
            ArtifactKind::SessionStem { from, to, part } => format!("{slug}-{from}-{to}-{part}"),
            ArtifactKind::Unmastered { from, to } => format!("{slug}-{from}-{to}-[unmastered]"),
            ArtifactKind::NumberedMaster { from, to, version } => {
                format!("{slug}-{from}-{to}-{version}")
            }
            ArtifactKind::FinalMaster { from, to } => format!("{slug}-{from}-{to}-FINAL"),
        }
    }

    /// Full filename; an empty extension yields a bare stem.
    pub fn file_name(&self, ext: &str) -> String {
        let stem = self.stem();
        if ext.is_empty() {
            stem
        } else {
            format!("{stem}.{ext}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn token(s: &str) -> TimeToken {
        TimeToken::parse(s).unwrap()
    }

    #[test]
    fn test_title_from_name() {
        assert_eq!(title_from_name("my_track"), "My Track");
        assert_eq!(title_from_name("MY_TRACK"), "MY TRACK");
        assert_eq!(title_from_name("late_night_DJ_edit"), "Late Night DJ Edit");
        assert_eq!(title_from_name("solo"), "Solo");
        assert_eq!(title_from_name("double__gap"), "Double  Gap");
    }

    #[test]
    fn test_slug_from_name() {
        assert_eq!(slug_from_name("my_track"), "MY_TRACK");
        assert_eq!(slug_from_name("Night Drive"), "NIGHT DRIVE");
    }

    #[test]
    fn test_validate_suffix() {
        for ok in ["0115P", "1200A", "9999A", "0000P"] {
            assert!(validate_suffix(ok), "{ok} should be valid");
        }
        for bad in [
            "", "115P", "01150P", "0115p", "0115", "0115X", "01:15P", "0115PM", " 0115P",
            "0115P\n", "٠١١٥P",
        ] {
            assert!(!validate_suffix(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_format_suffix() {
        let cases = [
            ((0, 5), "1205A"),
            ((9, 7), "0907A"),
            ((12, 0), "1200P"),
            ((13, 15), "0115P"),
            ((23, 59), "1159P"),
        ];
        for ((h, m), expected) in cases {
            let time = NaiveTime::from_hms_opt(h, m, 0).unwrap();
            assert_eq!(format_suffix(&time), expected);
        }
    }

    #[test]
    fn test_now_suffix_is_valid() {
        assert!(validate_suffix(&format_now_suffix()));
        TimeToken::parse(TimeToken::now().as_str()).unwrap();
    }

    #[test]
    fn test_parse_labeled_error_names_field() {
        let err = TimeToken::parse_labeled("12:55", "to").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Invalid to '12:55'"), "{msg}");
    }

    #[test]
    fn test_artifact_file_names() {
        let a = token("1200A");
        let b = token("1255A");
        let cases = [
            (ArtifactKind::Savepoint { token: &a }, "MY_TRACK-1200A.wav"),
            (
                ArtifactKind::Stem {
                    token: &a,
                    part: "VOCALS",
                },
                "MY_TRACK-1200A-VOCALS.wav",
            ),
            (
                ArtifactKind::SessionStem {
                    from: &a,
                    to: &b,
                    part: "BASS",
                },
                "MY_TRACK-1200A-1255A-BASS.wav",
            ),
            (
                ArtifactKind::Unmastered { from: &a, to: &b },
                "MY_TRACK-1200A-1255A-[unmastered].wav",
            ),
            (
                ArtifactKind::NumberedMaster {
                    from: &a,
                    to: &b,
                    version: 3,
                },
                "MY_TRACK-1200A-1255A-3.wav",
            ),
            (
                ArtifactKind::FinalMaster { from: &a, to: &b },
                "MY_TRACK-1200A-1255A-FINAL.wav",
            ),
        ];
        for (kind, expected) in cases {
            assert_eq!(ArtifactName::new("MY_TRACK", kind).file_name("wav"), expected);
        }
    }

    #[test]
    fn test_file_name_without_extension() {
        let a = token("0115P");
        let name = ArtifactName::new("MY_TRACK", ArtifactKind::Savepoint { token: &a });
        assert_eq!(name.file_name(""), "MY_TRACK-0115P");
    }
}
