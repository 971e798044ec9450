//! Column names of the long-format layouts and typed column extraction.

use polars::prelude::*;
use sagres_traits::{Date, MarketData, Result, SagresError};

/// Asset identifier.
pub const SYMBOL: &str = "symbol";
/// Observation date, `YYYY-MM-DD` or a polars `Date`.
pub const DATE: &str = "date";
/// Split- and dividend-adjusted close.
pub const ADJUSTED_CLOSE: &str = "adjusted_close";
/// Unadjusted close, used when no adjusted close is present.
pub const CLOSE: &str = "close";
/// Traded volume, optional.
pub const VOLUME: &str = "volume";
/// Factor name in multi-factor files.
pub const FACTOR_NAME: &str = "factor_name";
/// Factor value.
pub const VALUE: &str = "value";
/// Market capitalization.
pub const MARKET_CAP: &str = "market_cap";

fn column<'a>(data: &'a MarketData, name: &str) -> Result<&'a Column> {
    data.column(name)
        .ok_or_else(|| SagresError::MissingColumn(name.to_string()))
}

/// String values of a column, whatever its stored type.
pub(crate) fn strings(data: &MarketData, name: &str) -> Result<Vec<Option<String>>> {
    let cast = column(data, name)?.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Float values of a column; nulls stay `None`.
pub(crate) fn floats(data: &MarketData, name: &str) -> Result<Vec<Option<f64>>> {
    let cast = column(data, name)?.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Parses the leading `YYYY-MM-DD` of a date or datetime string.
pub fn parse_date(value: &str) -> Result<Date> {
    let head = value.trim().get(..10).unwrap_or(value);
    Date::parse_from_str(head, "%Y-%m-%d")
        .map_err(|e| SagresError::InvalidDate(format!("'{value}': {e}")))
}

/// Dates of a column; nulls stay `None`, unparseable values are errors.
pub(crate) fn dates(data: &MarketData, name: &str) -> Result<Vec<Option<Date>>> {
    strings(data, name)?
        .into_iter()
        .map(|v| v.as_deref().map(parse_date).transpose())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            Date::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            parse_date("2024-01-15 00:00:00.000").unwrap(),
            Date::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(matches!(parse_date("15/01/2024"), Err(SagresError::InvalidDate(_))));
        assert!(parse_date("bad").is_err());
    }

    #[test]
    fn test_typed_columns() {
        let data = MarketData::new(
            df! {
                "symbol" => ["A", "B"],
                "date" => ["2024-01-02", "2024-01-03"],
                "value" => [Some(1.5), None],
                "count" => [3i64, 4],
            }
            .unwrap(),
        );

        assert_eq!(
            strings(&data, SYMBOL).unwrap(),
            vec![Some("A".to_string()), Some("B".to_string())]
        );
        assert_eq!(floats(&data, VALUE).unwrap(), vec![Some(1.5), None]);
        assert_eq!(floats(&data, "count").unwrap(), vec![Some(3.0), Some(4.0)]);
        assert_eq!(
            dates(&data, DATE).unwrap()[1],
            Some(Date::from_ymd_opt(2024, 1, 3).unwrap())
        );
        assert!(matches!(
            floats(&data, MARKET_CAP),
            Err(SagresError::MissingColumn(name)) if name == "market_cap"
        ));
    }
}
