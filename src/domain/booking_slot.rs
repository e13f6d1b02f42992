use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// The date and minute a table is reserved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingSlot {
    date: NaiveDate,
    time: NaiveTime,
}

impl BookingSlot {
    pub fn parse(date: &str, time: &str) -> Result<Self, InvalidBookingSlot> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| InvalidBookingSlot::Date(date.to_string()))?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
            .map_err(|_| InvalidBookingSlot::Time(time.to_string()))?;
        let time = time
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(|| InvalidBookingSlot::Time(time.to_string()))?;
        Ok(Self { date, time })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn booking_time(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Arrival time as shown to guests, `HH:MM`.
    pub fn arrival(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InvalidBookingSlot {
    #[error("{0} is not a valid date, expected YYYY-MM-DD.")]
    Date(String),
    #[error("{0} is not a valid time, expected HH:MM.")]
    Time(String),
}
