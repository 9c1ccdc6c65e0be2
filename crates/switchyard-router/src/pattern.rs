//! Route pattern parsing.
//!
//! A pattern is split on `/` into segments. Each segment is one of:
//!
//! - a literal (`articles`), matched byte-for-byte;
//! - a named parameter (`{articleID}`), matching any non-empty segment;
//! - a constrained parameter (`{slug:[a-z-]+}`), matching only when the
//!   whole segment satisfies the regular expression;
//! - a composite of literal text and parameters (`{month}-{day}-{year}`),
//!   compiled to a single anchored regular expression;
//! - a trailing wildcard (`*` or `*name`) that swallows the rest of the path.
//!
//! Segments carry a [`Specificity`] that the matching tree uses to order
//! sibling branches.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use smallvec::SmallVec;

use crate::error::PatternError;
use crate::params::Params;

/// Parameter name used for an anonymous trailing wildcard (`/*`).
pub const WILDCARD_PARAM: &str = "*";

/// Prefix for the capture groups generated for composite segments.
const GROUP_PREFIX: &str = "__sy_p";

/// Precedence class of a segment, most specific first.
///
/// Sibling branches in the matching tree are tried in this order; within a
/// class the first registered branch wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    /// A literal segment.
    Static,
    /// A segment carrying at least one regular-expression constraint.
    Constrained,
    /// Literal text mixed with unconstrained parameters.
    Composite,
    /// A bare `{name}` parameter.
    Param,
    /// A trailing `*` wildcard.
    Wildcard,
}

/// One `/`-separated piece of a [`Pattern`].
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal text.
    Static(String),
    /// Unconstrained named parameter.
    Param(String),
    /// Regex-backed segment (constrained parameter or composite).
    Matcher(SegmentMatcher),
    /// Trailing wildcard bound to the given name.
    Wildcard(String),
}

impl Segment {
    /// Returns the precedence class of this segment.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        match self {
            Self::Static(_) => Specificity::Static,
            Self::Param(_) => Specificity::Param,
            Self::Matcher(m) if m.constrained => Specificity::Constrained,
            Self::Matcher(_) => Specificity::Composite,
            Self::Wildcard(_) => Specificity::Wildcard,
        }
    }

    /// Returns the source text this segment was parsed from.
    #[must_use]
    pub fn source(&self) -> String {
        match self {
            Self::Static(s) => s.clone(),
            Self::Param(name) => format!("{{{name}}}"),
            Self::Matcher(m) => m.source.clone(),
            Self::Wildcard(name) if name == WILDCARD_PARAM => "*".to_string(),
            Self::Wildcard(name) => format!("*{name}"),
        }
    }

    /// Returns true if both segments match exactly the same inputs and bind
    /// the same names.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Static(a), Self::Static(b))
            | (Self::Param(a), Self::Param(b))
            | (Self::Wildcard(a), Self::Wildcard(b)) => a == b,
            (Self::Matcher(a), Self::Matcher(b)) => a.source == b.source,
            _ => false,
        }
    }

    /// Returns true if both segments accept exactly the same inputs,
    /// whatever names they bind.
    #[must_use]
    pub fn accepts_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Static(a), Self::Static(b)) => a == b,
            (Self::Param(_), Self::Param(_)) | (Self::Wildcard(_), Self::Wildcard(_)) => true,
            (Self::Matcher(a), Self::Matcher(b)) => a.regex.as_str() == b.regex.as_str(),
            _ => false,
        }
    }

    /// Tests a single request segment, pushing any bindings onto `params`.
    ///
    /// Wildcards are handled by the tree since they consume several
    /// segments; here they never match.
    pub fn matches(&self, segment: &str, params: &mut Params) -> bool {
        match self {
            Self::Static(s) => s == segment,
            Self::Param(name) => {
                if segment.is_empty() {
                    return false;
                }
                params.push(name.as_str(), segment);
                true
            }
            Self::Matcher(m) => m.capture(segment, params),
            Self::Wildcard(_) => false,
        }
    }
}

/// A compiled regex matcher for one path segment.
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    source: String,
    regex: Regex,
    names: Vec<String>,
    constrained: bool,
}

impl SegmentMatcher {
    /// Returns the parameter names bound by this segment, in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if any parameter in the segment carries a constraint.
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.constrained
    }

    fn capture(&self, segment: &str, params: &mut Params) -> bool {
        let Some(caps) = self.regex.captures(segment) else {
            return false;
        };
        for (i, name) in self.names.iter().enumerate() {
            let value = caps
                .name(&format!("{GROUP_PREFIX}{i}"))
                .map_or("", |m| m.as_str());
            params.push(name.as_str(), value);
        }
        true
    }
}

/// A parsed route pattern such as `/articles/{articleSlug:[a-z-]+}`.
///
/// # Example
///
/// ```rust
/// use switchyard_router::{Pattern, Specificity};
///
/// let pattern: Pattern = "/articles/{month}-{day}-{year}".parse().unwrap();
/// assert_eq!(pattern.segments().len(), 2);
/// assert_eq!(pattern.segments()[1].specificity(), Specificity::Composite);
/// assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["month", "day", "year"]);
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parses a pattern string.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] for unbalanced braces, empty or repeated
    /// parameter names, invalid constraints, or a wildcard that is not the
    /// final segment.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());

        for (i, part) in raw.iter().enumerate() {
            let segment = parse_segment(pattern, part)?;
            if matches!(segment, Segment::Wildcard(_)) && i + 1 != raw.len() {
                return Err(PatternError::WildcardNotLast {
                    pattern: pattern.to_string(),
                });
            }
            segments.push(segment);
        }

        let parsed = Self {
            source: pattern.to_string(),
            segments,
        };

        {
            let mut seen: SmallVec<[&str; 8]> = SmallVec::new();
            for name in parsed.param_names() {
                if seen.contains(&name) {
                    return Err(PatternError::DuplicateParam {
                        pattern: pattern.to_string(),
                        param: name.to_string(),
                    });
                }
                seen.push(name);
            }
        }

        Ok(parsed)
    }

    /// Returns the original pattern string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if the pattern ends in a wildcard.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard(_)))
    }

    /// Iterates over every parameter name the pattern binds, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().flat_map(|segment| {
            let names: SmallVec<[&str; 4]> = match segment {
                Segment::Static(_) => SmallVec::new(),
                Segment::Param(name) | Segment::Wildcard(name) => {
                    smallvec::smallvec![name.as_str()]
                }
                Segment::Matcher(m) => m.names.iter().map(String::as_str).collect(),
            };
            names
        })
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Splits a request path into its non-empty segments.
#[must_use]
pub fn split_path(path: &str) -> SmallVec<[&str; 8]> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// A piece of a composite segment.
enum Piece<'a> {
    Literal(&'a str),
    Param {
        name: &'a str,
        constraint: Option<&'a str>,
    },
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, PatternError> {
    if let Some(name) = part.strip_prefix('*') {
        if name.contains(['{', '}', '*']) {
            return Err(PatternError::UnbalancedBrace {
                pattern: pattern.to_string(),
            });
        }
        let name = if name.is_empty() { WILDCARD_PARAM } else { name };
        return Ok(Segment::Wildcard(name.to_string()));
    }

    if !part.contains(['{', '}']) {
        return Ok(Segment::Static(part.to_string()));
    }

    let pieces = split_pieces(pattern, part)?;

    if let [Piece::Param {
        name,
        constraint: None,
    }] = pieces.as_slice()
    {
        return Ok(Segment::Param((*name).to_string()));
    }

    compile_matcher(pattern, part, &pieces).map(Segment::Matcher)
}

fn split_pieces<'a>(pattern: &str, part: &'a str) -> Result<Vec<Piece<'a>>, PatternError> {
    let unbalanced = || PatternError::UnbalancedBrace {
        pattern: pattern.to_string(),
    };

    let mut pieces = Vec::new();
    let mut rest = part;

    while !rest.is_empty() {
        let Some(open) = rest.find('{') else {
            if rest.contains('}') {
                return Err(unbalanced());
            }
            pieces.push(Piece::Literal(rest));
            break;
        };

        if open > 0 {
            let literal = &rest[..open];
            if literal.contains('}') {
                return Err(unbalanced());
            }
            pieces.push(Piece::Literal(literal));
        }

        // Constraints may contain their own braces (`{year:[0-9]{4}}`).
        let mut depth = 0usize;
        let mut close = None;
        for (i, c) in rest[open..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(unbalanced)?;

        let inner = &rest[open + 1..close];
        let (name, constraint) = match inner.split_once(':') {
            Some((name, constraint)) => (name, Some(constraint)),
            None => (inner, None),
        };
        if name.is_empty() {
            return Err(PatternError::EmptyParamName {
                pattern: pattern.to_string(),
            });
        }
        pieces.push(Piece::Param { name, constraint });
        rest = &rest[close + 1..];
    }

    Ok(pieces)
}

fn compile_matcher(
    pattern: &str,
    part: &str,
    pieces: &[Piece<'_>],
) -> Result<SegmentMatcher, PatternError> {
    let mut expr = String::from("^");
    let mut names = Vec::new();
    let mut constrained = false;

    for piece in pieces {
        match piece {
            Piece::Literal(text) => expr.push_str(&regex::escape(text)),
            Piece::Param { name, constraint } => {
                let group = format!("{GROUP_PREFIX}{}", names.len());
                match constraint {
                    Some(re) => {
                        // Validate the constraint on its own so errors name the parameter.
                        Regex::new(re).map_err(|e| PatternError::InvalidConstraint {
                            pattern: pattern.to_string(),
                            param: (*name).to_string(),
                            reason: e.to_string(),
                        })?;
                        constrained = true;
                        expr.push_str(&format!("(?P<{group}>(?:{re}))"));
                    }
                    None => expr.push_str(&format!("(?P<{group}>.+?)")),
                }
                names.push((*name).to_string());
            }
        }
    }
    expr.push('$');

    let regex = Regex::new(&expr).map_err(|e| PatternError::InvalidConstraint {
        pattern: pattern.to_string(),
        param: names.last().cloned().unwrap_or_default(),
        reason: e.to_string(),
    })?;

    Ok(SegmentMatcher {
        source: part.to_string(),
        regex,
        names,
        constrained,
    })
}
