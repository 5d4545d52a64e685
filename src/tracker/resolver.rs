use super::models::{Instrument, InstrumentCatalog, OptionKind};
use chrono::NaiveDate;

// Strikes in the catalog are exact multiples of the tick, so a tight tolerance is enough
const STRIKE_EPSILON: f64 = 1e-6;

/// Find the nearest-expiry contract for `underlying` / `kind` / `strike`.
///
/// Only contracts expiring strictly after `as_of` qualify. Equal expiries are
/// broken by the lowest instrument token. Returns `None` when nothing matches;
/// callers skip that strike for the cycle.
pub fn resolve<'a>(
    catalog: &'a InstrumentCatalog,
    underlying: &str,
    kind: OptionKind,
    strike: f64,
    as_of: NaiveDate,
) -> Option<&'a Instrument> {
    catalog
        .instruments()
        .iter()
        .filter(|inst| inst.name == underlying && inst.option_type == Some(kind))
        .filter(|inst| {
            inst.strike
                .is_some_and(|s| (s - strike).abs() < STRIKE_EPSILON)
        })
        .filter_map(|inst| match inst.expiry {
            Some(expiry) if expiry > as_of => Some((expiry, inst)),
            _ => None,
        })
        .min_by_key(|(expiry, inst)| (*expiry, inst.instrument_token))
        .map(|(_, inst)| inst)
}

/// Find the index instrument by exact trading symbol (first match in catalog order)
pub fn resolve_index<'a>(
    catalog: &'a InstrumentCatalog,
    tradingsymbol: &str,
) -> Option<&'a Instrument> {
    catalog
        .instruments()
        .iter()
        .find(|inst| inst.tradingsymbol == tradingsymbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(token: u64, kind: OptionKind, strike: f64, expiry: NaiveDate) -> Instrument {
        Instrument {
            instrument_token: token,
            tradingsymbol: format!("NIFTY{}{}{}", expiry.format("%y%m%d"), strike, kind.code()),
            name: "NIFTY".to_string(),
            option_type: Some(kind),
            strike: Some(strike),
            expiry: Some(expiry),
        }
    }

    #[test]
    fn test_expiring_today_is_skipped() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        let catalog = InstrumentCatalog::new(
            vec![
                option(1, OptionKind::Call, 26000.0, today),
                option(2, OptionKind::Call, 26000.0, tomorrow),
            ],
            today,
        );

        let found = resolve(&catalog, "NIFTY", OptionKind::Call, 26000.0, today).unwrap();
        assert_eq!(found.instrument_token, 2);
    }

    #[test]
    fn test_tie_breaks_on_lowest_token() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2025, 12, 9).unwrap();
        let catalog = InstrumentCatalog::new(
            vec![
                option(900, OptionKind::Put, 26000.0, expiry),
                option(100, OptionKind::Put, 26000.0, expiry),
            ],
            today,
        );

        let found = resolve(&catalog, "NIFTY", OptionKind::Put, 26000.0, today).unwrap();
        assert_eq!(found.instrument_token, 100);
    }

    #[test]
    fn test_wrong_side_does_not_match() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2025, 12, 9).unwrap();
        let catalog =
            InstrumentCatalog::new(vec![option(5, OptionKind::Put, 26000.0, expiry)], today);

        assert!(resolve(&catalog, "NIFTY", OptionKind::Call, 26000.0, today).is_none());
        assert!(resolve(&catalog, "BANKNIFTY", OptionKind::Put, 26000.0, today).is_none());
    }
}
