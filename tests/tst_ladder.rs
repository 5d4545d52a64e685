use oi_tracker::tracker::{atm_strike, build_ladder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nifty_ladder_around_19820() {
        assert_eq!(atm_strike(19820.0, 50.0), Some(19800.0));
        assert_eq!(
            build_ladder(19820.0, 50.0, 5),
            vec![19700.0, 19750.0, 19800.0, 19850.0, 19900.0]
        );
    }

    #[test]
    fn test_odd_counts_give_exact_length() {
        for count in [1usize, 3, 5, 7, 11] {
            let ladder = build_ladder(44210.0, 100.0, count);
            assert_eq!(ladder.len(), count);
            assert_eq!(ladder[count / 2], 44200.0);
            assert!(ladder.windows(2).all(|w| w[1] - w[0] == 100.0));
        }
    }

    #[test]
    fn test_even_count_drops_one_strike() {
        assert_eq!(build_ladder(19820.0, 50.0, 4), vec![19750.0, 19800.0, 19850.0]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(build_ladder(19820.0, 50.0, 0).is_empty());
        assert!(build_ladder(19820.0, 0.0, 5).is_empty());
        assert!(build_ladder(f64::NAN, 50.0, 5).is_empty());
    }
}
