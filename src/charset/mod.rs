//! Canonical sets of Unicode code point ranges.
//!
//! Every terminal symbol of a grammar is a [Charset]. The canonical form (sorted, pairwise
//! non-overlapping, maximally coalesced ranges) makes structural equality and hashing reliable,
//! which the symbol interning and the first/follow machinery depend on.

use crate::GrammarError;
use once_cell::sync::Lazy;
use std::fmt::{Display, Formatter};

#[cfg(test)]
mod __tests__;

/// The largest Unicode scalar value; the charset universe is `[0, UNICODE_MAX]`.
pub const UNICODE_MAX: u32 = 0x10FFFF;

/// The reserved out-of-band code point representing end of input (`$`).
///
/// Strictly outside the Unicode universe, so [Charset::complement] can never produce it.
pub const ENDMARKER: u32 = 0x20_0000;

static ANYSET: Lazy<Charset> = Lazy::new(|| Charset::of_range(URange::full()));
static ENDMARKER_SET: Lazy<Charset> = Lazy::new(|| Charset::of_char(ENDMARKER));

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// An inclusive code point range `start..=stop`.
pub struct URange {
    start: u32,
    stop: u32,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, Default)]
/// An ordered sequence of [URange]s kept in canonical form: sorted by start, pairwise
/// non-overlapping and with no two adjacent ranges left unmerged.
pub struct Charset {
    ranges: Vec<URange>,
}

impl URange {
    /// Create a range, rejecting inverted bounds.
    pub fn new(start: u32, stop: u32) -> Result<Self, GrammarError> {
        if start > stop || stop > ENDMARKER {
            Err(GrammarError::InvalidRange { start, stop })
        } else {
            Ok(Self { start, stop })
        }
    }

    /// The single code point `c..=c`.
    pub fn of_char(c: u32) -> Self {
        Self { start: c, stop: c }
    }

    /// The whole Unicode universe `[0, UNICODE_MAX]`.
    pub fn full() -> Self {
        Self {
            start: 0,
            stop: UNICODE_MAX,
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn stop(&self) -> u32 {
        self.stop
    }

    /// Number of code points covered.
    pub fn count(&self) -> u64 {
        (self.stop - self.start) as u64 + 1
    }

    pub fn contains(&self, c: u32) -> bool {
        self.start <= c && c <= self.stop
    }
}

impl Charset {
    /// Create an empty charset.
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Create a charset holding a single code point.
    pub fn of_char(c: u32) -> Self {
        Self {
            ranges: vec![URange::of_char(c)],
        }
    }

    /// Create a charset holding a single range.
    pub fn of_range(r: URange) -> Self {
        Self { ranges: vec![r] }
    }

    /// Create a charset from a sequence of ranges, rectifying once at the end.
    pub fn from_ranges<I: IntoIterator<Item = URange>>(ranges: I) -> Self {
        let mut s = Self {
            ranges: ranges.into_iter().collect(),
        };
        s.rectify();
        s
    }

    /// The distinguished set covering the whole Unicode universe.
    pub fn anyset() -> &'static Self {
        &ANYSET
    }

    /// The singleton set `{ENDMARKER}` backing the `$` terminal.
    pub fn endmarker_set() -> &'static Self {
        &ENDMARKER_SET
    }

    pub fn ranges(&self) -> &[URange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn is_anyset(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0] == URange::full()
    }

    pub fn is_single_char(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0].start == self.ranges[0].stop
    }

    /// Total number of code points covered by all ranges.
    pub fn count(&self) -> u64 {
        self.ranges.iter().map(URange::count).sum()
    }

    /// Insert a single code point and restore canonical form.
    pub fn add_char(&mut self, c: u32) {
        self.add_range(URange::of_char(c));
    }

    /// Insert a range and restore canonical form.
    pub fn add_range(&mut self, r: URange) {
        self.ranges.push(r);
        self.rectify();
    }

    /// Sort ranges by start and merge every overlapping or adjacent pair.
    fn rectify(&mut self) {
        self.ranges.sort_by_key(|r| (r.start, r.stop));
        let mut reduced: Vec<URange> = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            match reduced.last_mut() {
                Some(last) if r.start <= last.stop.saturating_add(1) => {
                    if r.stop > last.stop {
                        last.stop = r.stop;
                    }
                }
                _ => reduced.push(r),
            }
        }
        self.ranges = reduced;
    }

    /// Union of two charsets as a new canonical charset.
    pub fn union(&self, other: &Charset) -> Charset {
        let mut out = self.clone();
        out.union_into(other);
        out
    }

    /// Merge `other` into self, restoring canonical form.
    pub fn union_into(&mut self, other: &Charset) {
        self.ranges.extend_from_slice(&other.ranges);
        self.rectify();
    }

    /// Intersection of two charsets.
    pub fn intersect(&self, other: &Charset) -> Charset {
        let mut out = Charset::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let a = self.ranges[i];
            let b = other.ranges[j];
            let start = a.start.max(b.start);
            let stop = a.stop.min(b.stop);
            if start <= stop {
                out.ranges.push(URange { start, stop });
            }
            if a.stop < b.stop {
                i += 1;
            } else {
                j += 1;
            }
        }
        out
    }

    /// The set of code points in self but not in `other`.
    pub fn difference(&self, other: &Charset) -> Charset {
        let mut out = Charset::new();
        for &a in &self.ranges {
            let mut start = a.start;
            let mut consumed = false;
            for &b in &other.ranges {
                if b.stop < start {
                    continue;
                }
                if b.start > a.stop {
                    break;
                }
                if b.start > start {
                    out.ranges.push(URange {
                        start,
                        stop: b.start - 1,
                    });
                }
                if b.stop >= a.stop {
                    consumed = true;
                    break;
                }
                start = b.stop + 1;
            }
            if !consumed && start <= a.stop {
                out.ranges.push(URange {
                    start,
                    stop: a.stop,
                });
            }
        }
        out
    }

    /// The complement over the Unicode universe `[0, UNICODE_MAX]`.
    ///
    /// Ranges above the universe (the endmarker) do not take part and are never produced.
    pub fn complement(&self) -> Charset {
        let mut out = Charset::new();
        let mut next = 0u32;
        for r in &self.ranges {
            if r.start > UNICODE_MAX {
                break;
            }
            if r.start > next {
                out.ranges.push(URange {
                    start: next,
                    stop: r.start - 1,
                });
            }
            let stop = r.stop.min(UNICODE_MAX);
            next = match stop.checked_add(1) {
                Some(n) => n,
                None => return out,
            };
            if next > UNICODE_MAX {
                return out;
            }
        }
        out.ranges.push(URange {
            start: next,
            stop: UNICODE_MAX,
        });
        out
    }

    /// Binary search for a single code point.
    pub fn contains_char(&self, c: u32) -> bool {
        self.contains_range(URange::of_char(c))
    }

    /// Range containment: every point of `r` must be covered.
    pub fn contains_range(&self, r: URange) -> bool {
        match self
            .ranges
            .binary_search_by(|probe| probe.start.cmp(&r.start))
        {
            Ok(i) => self.ranges[i].stop >= r.stop,
            Err(0) => false,
            Err(i) => self.ranges[i - 1].stop >= r.stop,
        }
    }

    /// Subset test, range by range.
    pub fn contains_set(&self, other: &Charset) -> bool {
        other.ranges.iter().all(|&r| self.contains_range(r))
    }

    /// Whether the two charsets share at least one code point.
    pub fn intersects(&self, other: &Charset) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let a = self.ranges[i];
            let b = other.ranges[j];
            if a.start.max(b.start) <= a.stop.min(b.stop) {
                return true;
            }
            if a.stop < b.stop {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }
}

/// Whether a code point needs escaping inside a displayed charset.
fn is_charset_escape(c: u32) -> bool {
    matches!(c, 0x2D | 0x5B | 0x5C | 0x5D) // - [ \ ]
}

pub(crate) fn write_codepoint(f: &mut Formatter<'_>, c: u32) -> std::fmt::Result {
    if c == ENDMARKER {
        return write!(f, "$");
    }
    match char::from_u32(c) {
        Some(ch) if is_charset_escape(c) => write!(f, "\\{}", ch),
        Some(ch) if !ch.is_control() && c > 0x20 => write!(f, "{}", ch),
        _ => write!(f, "\\u{{{:X}}}", c),
    }
}

impl Display for URange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_codepoint(f, self.start)?;
        if self.start != self.stop {
            write!(f, "-")?;
            write_codepoint(f, self.stop)?;
        }
        Ok(())
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.ranges.len() == 1 && self.ranges[0] == URange::of_char(ENDMARKER) {
            return write!(f, "$");
        }
        if self.is_single_char() {
            write!(f, "'")?;
            write_codepoint(f, self.ranges[0].start)?;
            return write!(f, "'");
        }
        write!(f, "[")?;
        for r in &self.ranges {
            write!(f, "{}", r)?;
        }
        write!(f, "]")
    }
}
