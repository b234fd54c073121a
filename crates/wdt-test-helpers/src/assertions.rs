//! Assertion macros for event journals and counters.

/// Assert that `expected` appears in `journal` in order, not necessarily
/// contiguously.
///
/// ```rust
/// use wdt_test_helpers::assert_subsequence;
///
/// assert_subsequence!(&[1, 5, 2, 7, 3], &[1, 2, 3]);
/// ```
#[macro_export]
macro_rules! assert_subsequence {
    ($journal:expr, $expected:expr $(,)?) => {
        $crate::assert_subsequence!($journal, $expected, "")
    };
    ($journal:expr, $expected:expr, $($arg:tt)+) => {{
        let journal = $journal;
        let expected = $expected;
        let mut remaining = journal.iter();
        for (i, wanted) in expected.iter().enumerate() {
            if !remaining.any(|seen| seen == wanted) {
                panic!(
                    "assertion failed: expected item {} ({:?}) not found in order\n  journal: {:?}\n  expected: {:?} {}",
                    i, wanted, journal, expected, format_args!($($arg)+)
                );
            }
        }
    }};
}

/// Assert that no item of `journal` satisfies `predicate`.
///
/// ```rust
/// use wdt_test_helpers::assert_none_match;
///
/// assert_none_match!(&[1, 3, 5], |n: &i32| n % 2 == 0);
/// ```
#[macro_export]
macro_rules! assert_none_match {
    ($journal:expr, $predicate:expr $(,)?) => {{
        let journal = $journal;
        let predicate = $predicate;
        if let Some((i, item)) = journal.iter().enumerate().find(|&(_, item)| predicate(item)) {
            panic!(
                "assertion failed: unexpected item at index {}: {:?}",
                i, item
            );
        }
    }};
}

/// Assert that a sequence never decreases.
///
/// ```rust
/// use wdt_test_helpers::assert_non_decreasing;
///
/// assert_non_decreasing!(&[0, 1, 1, 2, 10, 10]);
/// ```
#[macro_export]
macro_rules! assert_non_decreasing {
    ($collection:expr $(,)?) => {{
        let collection = $collection;
        let mut iter = collection.iter();
        if let Some(mut prev) = iter.next() {
            for (i, curr) in iter.enumerate() {
                if prev > curr {
                    panic!(
                        "assertion failed: sequence decreased\n  at index {}: {:?} > {:?}",
                        i + 1, prev, curr
                    );
                }
                prev = curr;
            }
        }
    }};
}

/// Assert that a value is within a range.
///
/// ```rust
/// use wdt_test_helpers::assert_in_range;
///
/// assert_in_range!(1000, 100..2000);
/// ```
#[macro_export]
macro_rules! assert_in_range {
    ($value:expr, $range:expr $(,)?) => {{
        let value = $value;
        let range = $range;
        if !range.contains(&value) {
            panic!("assertion failed: value {:?} is not in range {:?}", value, range);
        }
    }};
    ($value:expr, $range:expr, $($arg:tt)+) => {{
        let value = $value;
        let range = $range;
        if !range.contains(&value) {
            panic!("assertion failed: value {:?} is not in range {:?}: {}", value, range, format_args!($($arg)+));
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_subsequence_pass() {
        assert_subsequence!(&["init", "read", "clear", "start"], &["init", "start"]);
        assert_subsequence!(&[1, 2, 3], &[] as &[i32]);
    }

    #[test]
    #[should_panic(expected = "not found in order")]
    fn test_subsequence_out_of_order() {
        assert_subsequence!(&[1, 2, 3], &[3, 1]);
    }

    #[test]
    fn test_none_match_pass() {
        assert_none_match!(&["toggle", "delay"], |e: &&str| *e == "start");
    }

    #[test]
    #[should_panic(expected = "unexpected item at index 1")]
    fn test_none_match_fail() {
        assert_none_match!(&["toggle", "start"], |e: &&str| *e == "start");
    }

    #[test]
    fn test_non_decreasing_pass() {
        assert_non_decreasing!(&[0u32, 0, 1, 5, 5]);
    }

    #[test]
    #[should_panic(expected = "sequence decreased")]
    fn test_non_decreasing_fail() {
        assert_non_decreasing!(&[0u32, 2, 1]);
    }

    #[test]
    fn test_in_range_pass() {
        assert_in_range!(5, 0..=10);
    }

    #[test]
    #[should_panic(expected = "not in range")]
    fn test_in_range_fail() {
        assert_in_range!(11, 0..=10);
    }
}
