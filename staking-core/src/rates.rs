//! Exchange-rate oracle and fixed-point arithmetic
//!
//! All conversions are floor divisions over `u128` intermediates, so a
//! round trip loses at most one micro-unit. The stored exchange rate is
//! recomputed only by reward distribution; staking and unstaking at the
//! current rate mint and burn proportionally and leave it untouched.

/// Fixed-point scale of the exchange rate (1_000_000 = 1.0)
pub const RATE_SCALE: u64 = 1_000_000;

/// Basis-point scale (10_000 = 100%)
pub const BPS_SCALE: u64 = 10_000;

/// Convert base asset to liquid tokens at `rate`: `stx * SCALE / rate`
pub fn stx_to_liquid(stx_amount: u64, rate: u64) -> u64 {
    mul_div(stx_amount, RATE_SCALE, rate)
}

/// Convert liquid tokens to base asset at `rate`: `liquid * rate / SCALE`
pub fn liquid_to_stx(liquid_amount: u64, rate: u64) -> u64 {
    mul_div(liquid_amount, rate, RATE_SCALE)
}

/// Basis-point share of `amount`, floored
pub fn bps_share(amount: u64, bps: u64) -> u64 {
    mul_div(amount, bps, BPS_SCALE)
}

/// Recompute the exchange rate from protocol aggregates.
///
/// Identity rate while no liquid tokens exist.
pub fn recompute(total_staked: u64, total_liquid_tokens: u64) -> u64 {
    if total_liquid_tokens == 0 {
        RATE_SCALE
    } else {
        mul_div(total_staked, RATE_SCALE, total_liquid_tokens)
    }
}

/// `a * b / d` with a widened intermediate, floored.
///
/// A zero divisor or a result outside `u64` means a corrupted aggregate,
/// which is a programming error, not a user-facing condition.
fn mul_div(a: u64, b: u64, d: u64) -> u64 {
    assert!(d != 0, "fixed-point divisor must be positive");
    let wide = (a as u128) * (b as u128) / (d as u128);
    u64::try_from(wide).expect("fixed-point result exceeds u64 range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_rate_is_exact() {
        assert_eq!(stx_to_liquid(1_000_000, RATE_SCALE), 1_000_000);
        assert_eq!(liquid_to_stx(1_000_000, RATE_SCALE), 1_000_000);
        assert_eq!(liquid_to_stx(stx_to_liquid(123_456_789, RATE_SCALE), RATE_SCALE), 123_456_789);
    }

    #[test]
    fn test_conversions_floor() {
        // 1.08 rate: 1_000_000 ustx -> 925_925.9 liquid, floored
        assert_eq!(stx_to_liquid(1_000_000, 1_080_000), 925_925);
        // and back: 925_925 * 1.08 = 999_999
        assert_eq!(liquid_to_stx(925_925, 1_080_000), 999_999);
    }

    #[test]
    fn test_round_trip_loses_at_most_one_unit_below_parity() {
        // For rates at or below 1.0 the double floor loses at most one unit
        for rate in [1_000_000u64, 999_999, 990_000, 500_000] {
            for amount in [1u64, 13, 999_999, 1_000_000, 77_777_777] {
                let back = liquid_to_stx(stx_to_liquid(amount, rate), rate);
                assert!(
                    back <= amount && amount - back <= 1,
                    "rate={rate} amount={amount} back={back}"
                );
            }
        }
    }

    #[test]
    fn test_round_trip_loss_bounded_by_rate() {
        // Above parity each floor can drop up to one rate-sized step
        for rate in [1_000_001u64, 1_080_000, 2_345_678] {
            let bound = rate / RATE_SCALE + 1;
            for amount in [1u64, 14, 999_999, 1_000_000, 77_777_777] {
                let back = liquid_to_stx(stx_to_liquid(amount, rate), rate);
                assert!(
                    back <= amount && amount - back <= bound,
                    "rate={rate} amount={amount} back={back}"
                );
            }
        }
    }

    #[test]
    fn test_bps_share() {
        assert_eq!(bps_share(1_000_000, 1000), 100_000); // 10%
        assert_eq!(bps_share(1_000_000, 100), 10_000); // 1%
        assert_eq!(bps_share(99, 100), 0); // floors to zero
    }

    #[test]
    fn test_recompute_identity_at_zero_supply() {
        assert_eq!(recompute(0, 0), RATE_SCALE);
        assert_eq!(recompute(123, 0), RATE_SCALE);
    }

    #[test]
    fn test_recompute_rises_with_backing() {
        assert_eq!(recompute(10_800_000, 10_000_000), 1_080_000);
    }

    #[test]
    #[should_panic(expected = "divisor")]
    fn test_zero_rate_panics() {
        stx_to_liquid(1, 0);
    }
}
