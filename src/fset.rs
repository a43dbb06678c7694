//! First/follow sets.
//!
//! An [FSet] pairs a [Charset] of terminal code points with a `special` flag held out of band:
//! for a FIRST set the flag means "derives ϵ", for a FOLLOW set it means "`$` is in follow".
//! Keeping the flag outside the charset keeps ϵ from ever looking like a code point.

use crate::charset::{write_codepoint, Charset, ENDMARKER};
use std::fmt::{Display, Formatter, Write};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FSet {
    terminals: Charset,
    special: bool,
}

impl FSet {
    pub fn new() -> Self {
        Self {
            terminals: Charset::new(),
            special: false,
        }
    }

    pub fn terminals(&self) -> &Charset {
        &self.terminals
    }

    pub fn special(&self) -> bool {
        self.special
    }

    pub fn set_special(&mut self, special: bool) {
        self.special = special;
    }

    /// Merge a terminal charset into the set.
    pub fn add_set(&mut self, cs: &Charset) {
        self.terminals.union_into(cs);
    }

    /// Merge `other` into self; the special flag only propagates when `with_special` is set.
    pub fn union_into(&mut self, other: &FSet, with_special: bool) {
        self.terminals.union_into(&other.terminals);
        if with_special && other.special {
            self.special = true;
        }
    }

    /// Size measure used by the fixed-point engines: total code point count plus the flag.
    pub fn size(&self) -> u64 {
        self.terminals.count() + self.special as u64
    }

    /// Membership in the terminal charset alone; the special flag does not take part.
    pub fn contains(&self, c: u32) -> bool {
        self.terminals.contains_char(c)
    }

    /// Follow-set membership: the special flag stands for `$`, so the endmarker is admitted
    /// either through the charset or through the flag.
    pub fn follow_contains(&self, c: u32) -> bool {
        self.terminals.contains_char(c) || (self.special && c == ENDMARKER)
    }

    fn write(&self, f: &mut Formatter<'_>, special_mark: char) -> std::fmt::Result {
        f.write_char('{')?;
        let mut sep = false;
        for r in self.terminals.ranges() {
            if sep {
                f.write_str(", ")?;
            }
            if r.start() == r.stop() {
                write_codepoint(f, r.start())?;
            } else {
                write_codepoint(f, r.start())?;
                f.write_char('-')?;
                write_codepoint(f, r.stop())?;
            }
            sep = true;
        }
        if self.special {
            if sep {
                f.write_str(", ")?;
            }
            f.write_char(special_mark)?;
        }
        f.write_char('}')
    }

    /// Display the set as a FIRST set (`ϵ` for the special flag).
    pub fn first_display(&self) -> FSetDisplay<'_> {
        FSetDisplay {
            fset: self,
            special_mark: 'ϵ',
        }
    }

    /// Display the set as a FOLLOW set (`$` for the special flag).
    pub fn follow_display(&self) -> FSetDisplay<'_> {
        FSetDisplay {
            fset: self,
            special_mark: '$',
        }
    }
}

/// A borrowed display wrapper choosing how the special flag is rendered.
pub struct FSetDisplay<'f> {
    fset: &'f FSet,
    special_mark: char,
}

impl Display for FSetDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fset.write(f, self.special_mark)
    }
}
