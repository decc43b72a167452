//! Property-based tests for range resolution
//!
//! Uses proptest to check the range invariants across arbitrary file sizes
//! and header values.

use cratedrop_server::streaming::{ByteRange, ChunkPolicy, RangeError, RangeSpec};
use proptest::prelude::*;

// ===== Helpers =====

fn arbitrary_policy() -> impl Strategy<Value = ChunkPolicy> {
    (1u64..4096, 1u64..4096).prop_map(|(a, b)| ChunkPolicy {
        initial: a.min(b),
        steady: a.max(b),
    })
}

/// Walk the file the way a player does and collect every served range
fn walk(size: u64, policy: &ChunkPolicy) -> Vec<ByteRange> {
    let mut ranges = Vec::new();
    let mut next = 0;
    while next < size {
        let range = ByteRange::parse(&format!("bytes={next}-"), size, policy)
            .expect("in-bounds open-ended range must resolve");
        next = range.end + 1;
        ranges.push(range);
    }
    ranges
}

// ===== Property Tests =====

proptest! {
    /// Property: every resolved range lies inside the file and respects the ceiling
    #[test]
    fn resolved_ranges_are_in_bounds(
        size in 0u64..10_000_000,
        start in 0u64..12_000_000,
        end in proptest::option::of(0u64..12_000_000),
        policy in arbitrary_policy(),
    ) {
        let spec = RangeSpec { start, end };
        match spec.resolve(size, &policy) {
            Ok(range) => {
                prop_assert!(range.start <= range.end);
                prop_assert!(range.end < size);
                prop_assert_eq!(range.start, start);
                prop_assert!(range.len() <= policy.steady);
                if end.is_none() && start == 0 {
                    prop_assert!(range.len() <= policy.initial);
                }
            }
            Err(e) => {
                prop_assert_eq!(e, RangeError::Unsatisfiable);
                prop_assert!(size == 0 || start >= size || end.is_some());
            }
        }
    }

    /// Property: a start at or past EOF is never satisfiable
    #[test]
    fn start_past_eof_is_unsatisfiable(
        size in 0u64..10_000_000,
        overshoot in 0u64..1_000_000,
        policy in arbitrary_policy(),
    ) {
        let result = ByteRange::parse(&format!("bytes={}-", size + overshoot), size, &policy);
        prop_assert_eq!(result, Err(RangeError::Unsatisfiable));
    }

    /// Property: sequential open-ended requests tile the file exactly once
    #[test]
    fn sequential_walk_covers_file(
        size in 1u64..200_000,
        policy in arbitrary_policy(),
    ) {
        let ranges = walk(size, &policy);

        prop_assert_eq!(ranges[0].start, 0);
        prop_assert_eq!(ranges.last().map(|r| r.end), Some(size - 1));
        for pair in ranges.windows(2) {
            prop_assert_eq!(pair[1].start, pair[0].end + 1);
        }
        let total: u64 = ranges.iter().map(ByteRange::len).sum();
        prop_assert_eq!(total, size);
    }

    /// Property: resolution is a pure function of header, size and policy
    #[test]
    fn resolution_is_idempotent(
        size in 0u64..10_000_000,
        header in "bytes=[0-9]{1,8}-[0-9]{0,8}",
        policy in arbitrary_policy(),
    ) {
        prop_assert_eq!(
            ByteRange::parse(&header, size, &policy),
            ByteRange::parse(&header, size, &policy)
        );
    }

    /// Property: the initial chunk always starts at zero and fits the file
    #[test]
    fn initial_chunk_fits(
        size in 1u64..10_000_000,
        policy in arbitrary_policy(),
    ) {
        let range = ByteRange::initial(size, &policy).unwrap();
        prop_assert_eq!(range.start, 0);
        prop_assert!(range.end < size);
        prop_assert_eq!(range.len(), policy.initial.min(size));
    }

    /// Property: arbitrary header text never panics the parser
    #[test]
    fn parser_never_panics(header in ".{0,40}") {
        let _ = RangeSpec::parse(&header);
    }
}
