use crate::charset::{Charset, URange, ENDMARKER, UNICODE_MAX};

fn range(start: u32, stop: u32) -> URange {
    URange::new(start, stop).unwrap()
}

fn assert_canonical(s: &Charset) {
    let ranges = s.ranges();
    for w in ranges.windows(2) {
        assert!(
            w[0].stop() < w[1].start(),
            "ranges out of order or overlapping: {:?}",
            ranges
        );
        assert!(
            w[1].start() - w[0].stop() > 1,
            "adjacent ranges left unmerged: {:?}",
            ranges
        );
    }
}

#[test]
fn inverted_range_is_rejected() {
    assert!(URange::new(10, 5).is_err());
    assert!(URange::new(5, 5).is_ok());
}

#[test]
fn add_range_merges_overlapping_and_adjacent() {
    let mut s = Charset::new();
    s.add_range(range('a' as u32, 'f' as u32));
    s.add_range(range('d' as u32, 'k' as u32));
    s.add_range(range('l' as u32, 'z' as u32)); // adjacent to [d-k] result
    assert_canonical(&s);
    assert_eq!(s.ranges().len(), 1);
    assert!(s.contains_range(range('a' as u32, 'z' as u32)));
}

#[test]
fn union_is_associative() {
    let a = Charset::from_ranges([range(0, 10), range(40, 60)]);
    let b = Charset::from_ranges([range(5, 45)]);
    let c = Charset::from_ranges([range(100, 200), range(61, 61)]);

    let left = a.union(&b).union(&c);
    let right = a.union(&b.union(&c));
    assert_eq!(left, right);
    assert_canonical(&left);
}

#[test]
fn intersect_with_complement_is_empty() {
    let a = Charset::from_ranges([range('0' as u32, '9' as u32), range(0x100, 0x1FF)]);
    let inter = a.intersect(&a.complement());
    assert!(inter.is_empty());
}

#[test]
fn union_with_complement_is_anyset() {
    let a = Charset::from_ranges([range(0, 5), range(9, UNICODE_MAX - 1)]);
    let u = a.union(&a.complement());
    assert!(u.is_anyset());
    assert_eq!(&u, Charset::anyset());
}

#[test]
fn complement_never_produces_the_endmarker() {
    let sets = [
        Charset::new(),
        Charset::of_char('a' as u32),
        Charset::of_char(ENDMARKER),
        Charset::anyset().clone(),
    ];
    for s in &sets {
        let c = s.complement();
        assert!(!c.contains_char(ENDMARKER), "complement of {} leaked $", s);
        assert_canonical(&c);
    }
    // complement of the empty set is the full universe, still without $
    assert!(Charset::new().complement().is_anyset());
}

#[test]
fn difference_removes_exactly_the_overlap() {
    let a = Charset::from_ranges([range(0, 20)]);
    let b = Charset::from_ranges([range(3, 5), range(10, 12), range(20, 30)]);
    let d = a.difference(&b);
    assert_canonical(&d);
    for c in 0..=20u32 {
        assert_eq!(d.contains_char(c), !b.contains_char(c), "code point {}", c);
    }
    assert!(!d.contains_char(21));
}

#[test]
fn difference_can_remove_the_endmarker() {
    let a = Charset::of_char(ENDMARKER);
    let d = a.difference(&Charset::of_char(ENDMARKER));
    assert!(d.is_empty());
}

#[test]
fn containment_checks() {
    let s = Charset::from_ranges([range('a' as u32, 'z' as u32), range('0' as u32, '9' as u32)]);
    assert!(s.contains_char('m' as u32));
    assert!(!s.contains_char('A' as u32));
    assert!(s.contains_range(range('c' as u32, 'x' as u32)));
    assert!(!s.contains_range(range('5' as u32, 'a' as u32)));

    let sub = Charset::from_ranges([range('b' as u32, 'd' as u32), range('7' as u32, '9' as u32)]);
    assert!(s.contains_set(&sub));
    assert!(!sub.contains_set(&s));
}

#[test]
fn intersects_matches_intersection_emptiness() {
    let a = Charset::from_ranges([range(0, 4), range(10, 14)]);
    let b = Charset::from_ranges([range(5, 9), range(15, 19)]);
    let c = Charset::from_ranges([range(4, 5)]);
    assert!(!a.intersects(&b));
    assert!(a.intersects(&c));
    assert!(b.intersects(&c));
    assert_eq!(a.intersects(&b), !a.intersect(&b).is_empty());
}

#[test]
fn equal_charsets_have_identical_canonical_form() {
    let a = Charset::from_ranges([range(0, 4), range(5, 9)]);
    let mut b = Charset::new();
    for c in (0..=9u32).rev() {
        b.add_char(c);
    }
    assert_eq!(a, b);
    assert_eq!(a.ranges(), b.ranges());
}

#[test]
fn count_and_single_char() {
    assert_eq!(Charset::of_char(7).count(), 1);
    assert!(Charset::of_char(7).is_single_char());
    let s = Charset::from_ranges([range(0, 9), range(20, 29)]);
    assert_eq!(s.count(), 20);
    assert_eq!(Charset::anyset().count(), UNICODE_MAX as u64 + 1);
}

#[test]
fn display_forms() {
    assert_eq!(format!("{}", Charset::of_char('a' as u32)), "'a'");
    assert_eq!(format!("{}", Charset::of_char(ENDMARKER)), "$");
    let s = Charset::from_ranges([range('0' as u32, '9' as u32), range('a' as u32, 'z' as u32)]);
    assert_eq!(format!("{}", s), "[0-9a-z]");
}
