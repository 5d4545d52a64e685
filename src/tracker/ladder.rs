/// Round the index price to the nearest strike.
///
/// Halfway prices round to the even multiple (19825 / 50 = 396.5 -> 396 -> 19800).
pub fn atm_strike(current_price: f64, strike_increment: f64) -> Option<f64> {
    if !current_price.is_finite() || !strike_increment.is_finite() || strike_increment <= 0.0 {
        return None;
    }
    Some((current_price / strike_increment).round_ties_even() * strike_increment)
}

/// Build the ascending strike ladder centered on ATM.
///
/// Returns `count` strikes for odd `count`; an even count yields `count - 1`.
/// Degenerate inputs (zero count, bad increment or price) give an empty ladder.
pub fn build_ladder(current_price: f64, strike_increment: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let Some(atm) = atm_strike(current_price, strike_increment) else {
        return Vec::new();
    };

    let half = ((count - 1) / 2) as i64;
    (-half..=half)
        .map(|i| atm + i as f64 * strike_increment)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atm_rounds_half_to_even() {
        assert_eq!(atm_strike(19825.0, 50.0), Some(19800.0));
        assert_eq!(atm_strike(19875.0, 50.0), Some(19900.0));
        assert_eq!(atm_strike(19826.0, 50.0), Some(19850.0));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(build_ladder(19820.0, 50.0, 0).is_empty());
        assert!(build_ladder(19820.0, 0.0, 5).is_empty());
        assert!(build_ladder(19820.0, -50.0, 5).is_empty());
        assert!(build_ladder(f64::NAN, 50.0, 5).is_empty());
    }

    #[test]
    fn test_single_strike_is_atm() {
        assert_eq!(build_ladder(19820.0, 50.0, 1), vec![19800.0]);
    }
}
