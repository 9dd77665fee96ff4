use crate::errors::ValidationError;
use crate::models::{Quantity, Record, RecordSet};
use chrono::{DateTime, Duration, Utc};

/// Requests are stamped in UTC+9 regardless of server time zone.
const STAMP_OFFSET_HOURS: i64 = 9;
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn stamp(now: DateTime<Utc>) -> String {
    (now.naive_utc() + Duration::hours(STAMP_OFFSET_HOURS))
        .format(STAMP_FORMAT)
        .to_string()
}

pub fn submit(
    records: &RecordSet,
    cafe_name: &str,
    quantity_kg: i64,
) -> Result<RecordSet, ValidationError> {
    submit_at(records, cafe_name, quantity_kg, Utc::now())
}

/// Appends one pickup request. `records` itself is never touched.
pub fn submit_at(
    records: &RecordSet,
    cafe_name: &str,
    quantity_kg: i64,
    now: DateTime<Utc>,
) -> Result<RecordSet, ValidationError> {
    let cafe_name = cafe_name.trim();
    if cafe_name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if quantity_kg < 1 {
        return Err(ValidationError::NonPositiveQuantity(quantity_kg));
    }

    let mut updated = records.clone();
    updated.push(Record {
        cafe_name: cafe_name.to_string(),
        quantity_kg: Quantity::whole(quantity_kg),
        requested_at: stamp(now),
    });
    Ok(updated)
}

/// Parses the raw form field the same way the number input constrains it.
pub fn parse_quantity(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidQuantity)
}

/// Unchecked wholesale overwrite from the admin grid.
pub fn replace_all(records: RecordSet) -> RecordSet {
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone};

    fn existing() -> RecordSet {
        RecordSet::new(vec![Record {
            cafe_name: "Cafe Z".to_string(),
            quantity_kg: Quantity::Text("2".to_string()),
            requested_at: "2026-02-28 08:00".to_string(),
        }])
    }

    #[test]
    fn stamp_uses_fixed_plus_nine_offset() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 16, 30, 45).unwrap();
        assert_eq!(stamp(now), "2026-03-02 01:30");
    }

    #[test]
    fn submit_appends_one_record() {
        let records = existing();
        let updated = submit(&records, "Cafe A", 3).unwrap();

        assert_eq!(updated.len(), records.len() + 1);
        assert_eq!(&updated.as_slice()[..1], records.as_slice());
        let last = updated.last().unwrap();
        assert_eq!(last.cafe_name, "Cafe A");
        assert_eq!(last.quantity_kg, Quantity::whole(3));
        assert_eq!(last.quantity_kg.kg(), 3.0);
        assert_eq!(last.requested_at.len(), 16);
        assert!(NaiveDateTime::parse_from_str(&last.requested_at, STAMP_FORMAT).is_ok());
    }

    #[test]
    fn submit_trims_the_name() {
        let updated = submit(&RecordSet::default(), "  Cafe A \n", 1).unwrap();
        assert_eq!(updated.last().unwrap().cafe_name, "Cafe A");
    }

    #[test]
    fn empty_name_is_rejected_without_mutation() {
        let records = existing();
        assert_eq!(submit(&records, "", 5), Err(ValidationError::EmptyName));
        assert_eq!(submit(&records, "   ", 5), Err(ValidationError::EmptyName));
        assert_eq!(records, existing());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let records = existing();
        assert_eq!(
            submit(&records, "Cafe A", 0),
            Err(ValidationError::NonPositiveQuantity(0))
        );
        assert_eq!(
            submit(&records, "Cafe A", -4),
            Err(ValidationError::NonPositiveQuantity(-4))
        );
    }

    #[test]
    fn parse_quantity_accepts_whole_numbers_only() {
        assert_eq!(parse_quantity(" 12 "), Ok(12));
        assert_eq!(parse_quantity("1.5"), Err(ValidationError::InvalidQuantity));
        assert_eq!(parse_quantity(""), Err(ValidationError::InvalidQuantity));
    }

    #[test]
    fn replace_all_keeps_the_given_rows() {
        let records = existing();
        assert_eq!(replace_all(records.clone()), records);
        assert!(replace_all(RecordSet::default()).is_empty());
    }
}
