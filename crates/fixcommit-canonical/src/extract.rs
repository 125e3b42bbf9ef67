//! Field extraction from raw `tag=value` message text.
//!
//! Extraction is lenient about individual pairs (malformed ones are dropped
//! and reported) and strict about structure: duplicate fields and group
//! counts that disagree with the entries present are errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::CanonicalError;
use crate::report::{ExtractionReport, FixVersion, WarningCode};
use crate::schema::{GroupDef, GroupPosition, GroupScope, Schema};

/// BeginString.
pub const TAG_BEGIN_STRING: u32 = 8;

/// ApplVerID, the application version carried by FIXT.1.1 sessions.
pub const TAG_APPL_VER_ID: u32 = 1128;

/// Transport/session tags that never reach the canonical tree: BeginString,
/// BodyLength, CheckSum, MsgSeqNum, MsgType, PossDupFlag, SenderCompID,
/// SendingTime, TargetCompID, PossResend, OrigSendingTime.
pub const SESSION_TAGS: [u32; 11] = [8, 9, 10, 34, 35, 43, 49, 52, 56, 97, 122];

const SOH: char = '\u{1}';

/// Pair separator accepted by the extractor.
///
/// Input is always split on exactly one separator, so a value may contain
/// the other two. A line terminator at the very end of the input is not
/// part of the last value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// SOH if the input holds any SOH byte, otherwise `|` if it holds any,
    /// otherwise newline.
    #[default]
    Auto,
    /// `|`
    Pipe,
    /// ASCII 0x01.
    Soh,
    /// `\n` (a trailing `\r` is tolerated).
    Newline,
}

impl Delimiter {
    /// The fixed separator used for `input`. Only [`Delimiter::Auto`]
    /// looks at the input.
    pub fn resolve(self, input: &str) -> Delimiter {
        match self {
            Delimiter::Auto if input.contains(SOH) => Delimiter::Soh,
            Delimiter::Auto if input.contains('|') => Delimiter::Pipe,
            Delimiter::Auto => Delimiter::Newline,
            fixed => fixed,
        }
    }

    fn separator(self) -> char {
        match self {
            Delimiter::Soh => SOH,
            Delimiter::Newline => '\n',
            Delimiter::Auto | Delimiter::Pipe => '|',
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delimiter::Auto => "auto",
            Delimiter::Pipe => "pipe",
            Delimiter::Soh => "soh",
            Delimiter::Newline => "newline",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Delimiter::Auto),
            "pipe" | "|" => Ok(Delimiter::Pipe),
            "soh" | "\\x01" | "^a" => Ok(Delimiter::Soh),
            "newline" | "nl" | "\\n" => Ok(Delimiter::Newline),
            other => Err(format!("unknown delimiter '{other}'")),
        }
    }
}

/// Extraction settings.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Pair separator.
    pub delimiter: Delimiter,
    /// Tags removed in addition to [`SESSION_TAGS`].
    pub extra_excluded: BTreeSet<u32>,
}

impl ExtractOptions {
    /// Options using a fixed delimiter.
    pub fn with_delimiter(delimiter: Delimiter) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    fn excludes(&self, tag: u32) -> bool {
        SESSION_TAGS.contains(&tag) || self.extra_excluded.contains(&tag)
    }
}

/// One extracted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    /// Field tag.
    pub tag: u32,
    /// Field value, verbatim.
    pub value: String,
    /// Group positions enclosing the field; empty at the top level.
    #[serde(default)]
    pub scope: GroupScope,
}

impl RawField {
    /// A top-level field.
    pub fn top(tag: u32, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: value.into(),
            scope: GroupScope::root(),
        }
    }

    /// A field inside the given group scope.
    pub fn scoped(tag: u32, value: impl Into<String>, scope: GroupScope) -> Self {
        Self {
            tag,
            value: value.into(),
            scope,
        }
    }

    /// Innermost `(group, entry)` position, if the field is inside a group.
    pub fn group_context(&self) -> Option<GroupPosition> {
        self.scope.innermost()
    }
}

/// Output of [`extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Well-formed, non-session fields in input order.
    pub fields: Vec<RawField>,
    /// Dropped pairs, excluded tags, and metrics.
    pub report: ExtractionReport,
}

#[derive(Debug, Clone, Copy)]
struct Pair<'a> {
    tag: u32,
    value: &'a str,
}

/// Splits `input` into fields, resolving repeating groups with `schema`.
///
/// # Errors
///
/// - [`CanonicalError::DuplicateField`] when a tag repeats within one mapping.
/// - [`CanonicalError::InvalidGroupCount`] when a group count is not a number.
/// - [`CanonicalError::GroupCountMismatch`] when the entries present differ from the declared count.
pub fn extract(
    input: &str,
    schema: &Schema,
    options: &ExtractOptions,
) -> Result<Extraction, CanonicalError> {
    let mut report = ExtractionReport::new();
    let pairs = tokenize(input, options, &mut report);

    let mut parser = GroupParser {
        pairs: &pairs,
        position: 0,
        schema,
        fields: Vec::with_capacity(pairs.len()),
    };
    parser.parse_top_level()?;

    tracing::debug!(
        fields = parser.fields.len(),
        dropped = report.warnings.len(),
        excluded = report.excluded.len(),
        "extracted message fields"
    );

    Ok(Extraction {
        fields: parser.fields,
        report,
    })
}

fn tokenize<'a>(
    input: &'a str,
    options: &ExtractOptions,
    report: &mut ExtractionReport,
) -> Vec<Pair<'a>> {
    let delimiter = options.delimiter.resolve(input);
    let separator = delimiter.separator();
    let body = input.trim_end_matches(['\r', '\n']);
    let mut pairs = Vec::new();
    let mut appl_version = None;
    let segments = body
        .split(separator)
        .map(|s| match delimiter {
            Delimiter::Newline => s.strip_suffix('\r').unwrap_or(s),
            _ => s,
        })
        .filter(|s| !s.trim().is_empty());

    for (index, segment) in segments.enumerate() {
        report.bump("pairs_seen");
        let Some((raw_tag, value)) = segment.split_once('=') else {
            tracing::debug!(index, pair = segment, "dropping pair without '='");
            report.warn(index, WarningCode::MissingEquals, segment);
            continue;
        };
        let tag = match parse_tag(raw_tag.trim()) {
            Some(tag) => tag,
            None => {
                tracing::debug!(index, pair = segment, "dropping pair with invalid tag");
                report.warn(index, WarningCode::InvalidTag, segment);
                continue;
            }
        };
        if options.excludes(tag) {
            if tag == TAG_BEGIN_STRING {
                report.fix_version = FixVersion::parse(value);
            }
            report.excluded.push(tag);
            continue;
        }
        if value.is_empty() {
            tracing::debug!(index, tag, "dropping pair with empty value");
            report.warn(index, WarningCode::EmptyValue, segment);
            continue;
        }
        if tag == TAG_APPL_VER_ID {
            appl_version = FixVersion::from_appl_ver_id(value);
        }
        pairs.push(Pair { tag, value });
    }
    if appl_version.is_some() {
        report.fix_version = appl_version;
    }
    pairs
}

fn parse_tag(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().filter(|tag| *tag > 0)
}

fn parse_count(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

struct GroupParser<'p, 'a> {
    pairs: &'p [Pair<'a>],
    position: usize,
    schema: &'p Schema,
    fields: Vec<RawField>,
}

impl<'p, 'a> GroupParser<'p, 'a> {
    fn peek(&self) -> Option<Pair<'a>> {
        self.pairs.get(self.position).copied()
    }

    fn emit(&mut self, pair: Pair<'a>, scope: &GroupScope) {
        self.fields
            .push(RawField::scoped(pair.tag, pair.value, scope.clone()));
    }

    fn parse_top_level(&mut self) -> Result<(), CanonicalError> {
        let schema = self.schema;
        let scope = GroupScope::root();
        let mut seen = BTreeSet::new();
        while let Some(pair) = self.peek() {
            if !seen.insert(pair.tag) {
                return Err(CanonicalError::DuplicateField {
                    tag: pair.tag,
                    scope,
                });
            }
            self.position += 1;
            match schema.group_at(pair.tag, None) {
                Some(def) => self.parse_group(def, pair, &scope)?,
                None => self.emit(pair, &scope),
            }
        }
        Ok(())
    }

    fn parse_group(
        &mut self,
        def: &'p GroupDef,
        count: Pair<'a>,
        scope: &GroupScope,
    ) -> Result<(), CanonicalError> {
        let declared = parse_count(count.value).ok_or_else(|| CanonicalError::InvalidGroupCount {
            tag: count.tag,
            value: count.value.to_string(),
        })?;

        // Every entry that starts with the delimiter belongs to this group,
        // including any beyond the declared count.
        let mut found = 0;
        while let Some(pair) = self.peek() {
            if pair.tag != def.delimiter_tag {
                break;
            }
            self.parse_entry(def, &scope.enter(def.count_tag, found))?;
            found += 1;
        }

        if found != declared {
            return Err(CanonicalError::GroupCountMismatch {
                group_tag: def.count_tag,
                scope: scope.clone(),
                declared,
                found,
            });
        }
        Ok(())
    }

    fn parse_entry(&mut self, def: &'p GroupDef, scope: &GroupScope) -> Result<(), CanonicalError> {
        let schema = self.schema;
        let mut seen = BTreeSet::new();
        // The caller guarantees the entry starts at the delimiter field.
        if let Some(first) = self.peek() {
            seen.insert(first.tag);
            self.emit(first, scope);
            self.position += 1;
        }

        while let Some(pair) = self.peek() {
            if pair.tag == def.delimiter_tag || !def.accepts(pair.tag) {
                break;
            }
            if !seen.insert(pair.tag) {
                return Err(CanonicalError::DuplicateField {
                    tag: pair.tag,
                    scope: scope.clone(),
                });
            }
            self.position += 1;
            match schema.group_at(pair.tag, Some(def.count_tag)) {
                Some(nested) => self.parse_group(nested, pair, scope)?,
                None => self.emit(pair, scope),
            }
        }
        Ok(())
    }
}
