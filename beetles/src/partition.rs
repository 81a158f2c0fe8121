//! Load partitioning: splitting one step's request volume into per-slot counts.
//!
//! A step holding `rate` requests per second for `duration` needs
//! `T = round(rate * duration)` requests in total. The step is cut into
//! `N = ceil(duration / slice)` slots and each slot is one work order, i.e. one
//! worker invocation that will issue its share of requests.
//!
//! # Algorithm
//!
//! ```text
//! base  = T div N
//! extra = T mod N                  // first `extra` slots get base + 1
//! want  = share(i) + carry
//! count = min(want, ceiling)
//! carry = want - count             // pushed into slot i + 1
//! ```
//!
//! Whatever is still carried after the last natural slot is appended as
//! extra slots of at most `ceiling` requests each. Volume is never dropped:
//! the returned counts always sum to exactly `T`.
//!
//! Splitting the remainder one unit at a time over the earliest slots keeps
//! any two counts within 1 of each other as long as the ceiling does not bind,
//! so integer truncation never biases the achieved rate.
use std::time::Duration;

use crate::error::Error;

/// Default temporal length of one slot.
pub const DEFAULT_SLICE: Duration = Duration::from_secs(12);

/// Total number of requests a step must dispatch: `round(rate * duration)`.
pub fn total_volume(rate: f64, duration: Duration) -> Result<usize, Error> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(Error::invalid(format!(
            "target rate must be a positive finite number, got {rate}"
        )));
    }
    if duration.is_zero() {
        return Err(Error::invalid("step duration must be positive"));
    }

    let total = (rate * duration.as_secs_f64()).round();
    // `usize::MAX as f64` rounds up, so anything at or above it does not fit
    if !total.is_finite() || total >= usize::MAX as f64 {
        return Err(Error::invalid(format!(
            "{rate} rps over {duration:?} does not fit in a request count"
        )));
    }
    Ok(total as usize)
}

/// Split a step into ordered per-slot request counts.
///
/// Guarantees, for valid input:
/// - `len >= ceil(duration / slice)`
/// - every count is in `[0, ceiling]`
/// - the counts sum to exactly [`total_volume`]
pub fn partition(
    ceiling: usize,
    rate: f64,
    duration: Duration,
    slice: Duration,
) -> Result<Vec<usize>, Error> {
    if ceiling == 0 {
        return Err(Error::invalid("concurrency ceiling must be positive"));
    }
    if slice.is_zero() {
        return Err(Error::invalid("slice length must be positive"));
    }
    let total = total_volume(rate, duration)?;

    let slots = usize::try_from(duration.as_nanos().div_ceil(slice.as_nanos()))
        .map_err(|_| Error::invalid(format!("{duration:?} / {slice:?} yields too many slots")))?;

    let base = total / slots;
    let extra = total % slots;

    let mut counts = Vec::new();
    reserve_slots(&mut counts, slots)?;
    let mut carry = 0usize;
    for i in 0..slots {
        let share = base + usize::from(i < extra);
        let want = share + carry;
        let count = want.min(ceiling);
        carry = want - count;
        counts.push(count);
    }

    // The ceiling was binding, keep appending slots until the volume is absorbed
    reserve_slots(&mut counts, carry.div_ceil(ceiling))?;
    while carry > 0 {
        let count = carry.min(ceiling);
        carry -= count;
        counts.push(count);
    }

    Ok(counts)
}

fn reserve_slots(counts: &mut Vec<usize>, additional: usize) -> Result<(), Error> {
    counts.try_reserve_exact(additional).map_err(|e| {
        Error::invalid(format!(
            "cannot hold {} slots: {e}",
            counts.len().saturating_add(additional)
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn even_split_under_ceiling() {
        let counts = partition(1000, 10., secs(24), secs(12)).unwrap();
        assert_eq!(counts, vec![120, 120]);
    }

    #[test]
    fn binding_ceiling_appends_slots() {
        let counts = partition(50, 100., secs(12), secs(12)).unwrap();

        assert_eq!(counts.iter().sum::<usize>(), 1200);
        assert_eq!(counts.len(), 24);
        assert!(counts.iter().all(|c| *c == 50));
    }

    #[test]
    fn remainder_goes_to_earliest_slots() {
        // 100 requests over ceil(50 / 17) = 3 slots
        let counts = partition(1000, 2., secs(50), secs(17)).unwrap();
        assert_eq!(counts, vec![34, 33, 33]);
    }

    #[test]
    fn partial_last_slice_still_counts_as_a_slot() {
        // 25s / 12s -> 3 slots
        let counts = partition(1000, 12., secs(25), secs(12)).unwrap();
        assert_eq!(counts, vec![100, 100, 100]);
    }

    #[test]
    fn carry_flows_into_next_slot() {
        // 30 requests over 3 slots, ceiling 8: every slot saturates and the
        // overflow spills into one appended slot
        let counts = partition(8, 1., secs(30), secs(10)).unwrap();
        assert_eq!(counts, vec![8, 8, 8, 6]);
    }

    #[test]
    fn tiny_volume_rounds_to_nearest() {
        assert_eq!(partition(10, 0.26, secs(2), secs(12)).unwrap(), vec![1]);
        assert_eq!(partition(10, 0.2, secs(2), secs(12)).unwrap(), vec![0]);
    }

    #[test]
    fn sub_second_durations() {
        let counts = partition(100, 100., Duration::from_millis(250), secs(12)).unwrap();
        assert_eq!(counts, vec![25]);
    }

    #[test]
    fn rejects_invalid_input() {
        let bad = [
            partition(0, 10., secs(10), secs(12)),
            partition(10, 0., secs(10), secs(12)),
            partition(10, -1., secs(10), secs(12)),
            partition(10, f64::NAN, secs(10), secs(12)),
            partition(10, f64::INFINITY, secs(10), secs(12)),
            partition(10, 10., Duration::ZERO, secs(12)),
            partition(10, 10., secs(10), Duration::ZERO),
            partition(10, f64::MAX, secs(10), secs(12)),
        ];
        for res in bad {
            assert!(matches!(res, Err(Error::InvalidInput(_))), "{res:?}");
        }
    }

    #[test]
    fn rejects_slot_counts_that_cannot_be_allocated() {
        // 10 requests spread over 1e19 one-nanosecond slots
        let res = partition(1, 1e-9, secs(10_000_000_000), Duration::from_nanos(1));
        assert!(matches!(res, Err(Error::InvalidInput(_))), "{res:?}");

        // 1e19 requests through a ceiling of 1 need as many appended slots
        let res = partition(1, 1e18, secs(10), secs(12));
        assert!(matches!(res, Err(Error::InvalidInput(_))), "{res:?}");
    }

    proptest! {
        #[test]
        fn sums_to_total_volume(
            ceiling in 1usize..2_000,
            rate in 0.1f64..200.,
            duration in 1u64..300,
            slice in 1u64..60,
        ) {
            let counts = partition(ceiling, rate, secs(duration), secs(slice)).unwrap();
            let total = total_volume(rate, secs(duration)).unwrap();
            prop_assert_eq!(counts.iter().sum::<usize>(), total);
        }

        #[test]
        fn respects_ceiling_and_slot_count(
            ceiling in 1usize..2_000,
            rate in 0.1f64..200.,
            duration in 1u64..300,
            slice in 1u64..60,
        ) {
            let counts = partition(ceiling, rate, secs(duration), secs(slice)).unwrap();
            let slots = duration.div_ceil(slice) as usize;
            prop_assert!(counts.len() >= slots);
            prop_assert!(counts.iter().all(|c| *c <= ceiling));
        }

        #[test]
        fn even_when_ceiling_not_binding(
            rate in 0.1f64..200.,
            duration in 1u64..300,
            slice in 1u64..60,
        ) {
            let total = total_volume(rate, secs(duration)).unwrap();
            let slots = duration.div_ceil(slice) as usize;
            let ceiling = total.div_ceil(slots).max(1);

            let counts = partition(ceiling, rate, secs(duration), secs(slice)).unwrap();
            prop_assert_eq!(counts.len(), slots);
            let max = counts.iter().max().copied().unwrap_or(0);
            let min = counts.iter().min().copied().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }
    }
}
