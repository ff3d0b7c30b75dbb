//! Dates and times.
//!
//! A moment is written in exactly one of three forms, picked from its
//! components: a time of day (with fractional seconds and zone) when the
//! calendar date is January 1st of year 0, a bare date when the time of day is
//! midnight, and a full RFC 3339 date-time otherwise.

use std::fmt::Write;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};

use super::{Decode, Encode};
use crate::de::Decoder;
use crate::error::Result;
use crate::node::Node;
use crate::ser::Encoder;

fn zero_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(0, 1, 1)
}

fn format_moment(moment: NaiveDateTime, offset: Option<FixedOffset>) -> String {
    let (date, time) = (moment.date(), moment.time());
    let mut out = String::with_capacity(35);
    if Some(date) == zero_date() {
        write_time(&mut out, time);
        write_zone(&mut out, offset);
    } else if time == NaiveTime::MIN {
        write_date(&mut out, date);
    } else {
        write_date(&mut out, date);
        out.push('T');
        write_time(&mut out, time);
        write_zone(&mut out, offset);
    }
    out
}

fn write_date(out: &mut String, date: NaiveDate) {
    let _ = write!(out, "{:04}-{:02}-{:02}", date.year(), date.month(), date.day());
}

fn write_time(out: &mut String, time: NaiveTime) {
    let _ = write!(
        out,
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    );
    let nanos = time.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
}

fn write_zone(out: &mut String, offset: Option<FixedOffset>) {
    let Some(offset) = offset else {
        return;
    };
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        out.push('Z');
        return;
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    let _ = write!(out, "{sign}{:02}:{:02}", minutes / 60, minutes % 60);
}

/// Parses any of the written forms, plus a date-time without zone and a
/// time without seconds.
fn parse_moment(text: &str) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    if let Ok(moment) = DateTime::parse_from_rfc3339(text) {
        return Some((moment.naive_local(), Some(*moment.offset())));
    }
    if let Ok(moment) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some((moment, None));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some((date.and_time(NaiveTime::MIN), None));
    }
    let (time, offset) = parse_time(text)?;
    Some((zero_date()?.and_time(time), offset))
}

fn parse_time(text: &str) -> Option<(NaiveTime, Option<FixedOffset>)> {
    let (clock, offset) = if let Some(clock) = text.strip_suffix('Z') {
        (clock, Some(utc()))
    } else if let Some(at) = text.rfind(['+', '-']) {
        (&text[..at], Some(parse_offset(&text[at..])?))
    } else {
        (text, None)
    };
    let time = NaiveTime::parse_from_str(clock, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
        .ok()?;
    Some((time, offset))
}

/// Parses `+HH:MM` or `-HH:MM`.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    let (sign, rest) = text.split_at(1);
    let (hours, minutes) = rest.split_once(':')?;
    let hours = hours.parse::<u8>().ok().filter(|h| *h < 24)?;
    let minutes = minutes.parse::<u8>().ok().filter(|m| *m < 60)?;
    let seconds = i32::from(hours) * 3600 + i32::from(minutes) * 60;
    match sign {
        "-" => FixedOffset::west_opt(seconds),
        _ => FixedOffset::east_opt(seconds),
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn decode_with<T>(
    target: &mut T,
    decoder: &Decoder<'_>,
    is_zero: bool,
    convert: impl FnOnce(NaiveDateTime, Option<FixedOffset>) -> Option<T>,
    zero: impl FnOnce() -> T,
) -> Result<()> {
    let text = decoder.text()?;
    if text.is_empty() {
        if !is_zero {
            *target = zero();
        }
        return Ok(());
    }
    let (moment, offset) =
        parse_moment(text).ok_or_else(|| decoder.parse_error(format!("invalid time `{text}`")))?;
    *target = convert(moment, offset)
        .ok_or_else(|| decoder.parse_error(format!("time `{text}` is out of range")))?;
    Ok(())
}

impl Encode for DateTime<FixedOffset> {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.zeroable(self.is_empty_value(), || {
            format_moment(self.naive_local(), Some(*self.offset()))
        })
    }

    fn is_empty_value(&self) -> bool {
        self.timestamp() == 0 && self.timestamp_subsec_nanos() == 0
    }
}

impl Decode for DateTime<FixedOffset> {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        let is_zero = self.is_empty_value();
        decode_with(
            self,
            &decoder,
            is_zero,
            |moment, offset| offset.unwrap_or_else(utc).from_local_datetime(&moment).single(),
            DateTime::default,
        )
    }
}

impl Encode for DateTime<Utc> {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.zeroable(self.is_empty_value(), || {
            format_moment(self.naive_utc(), Some(utc()))
        })
    }

    fn is_empty_value(&self) -> bool {
        *self == DateTime::<Utc>::default()
    }
}

impl Decode for DateTime<Utc> {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        let is_zero = self.is_empty_value();
        decode_with(
            self,
            &decoder,
            is_zero,
            |moment, offset| {
                let local = offset.unwrap_or_else(utc).from_local_datetime(&moment).single()?;
                Some(local.with_timezone(&Utc))
            },
            DateTime::default,
        )
    }
}

impl Encode for NaiveDateTime {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.zeroable(self.is_empty_value(), || format_moment(*self, None))
    }

    fn is_empty_value(&self) -> bool {
        *self == NaiveDateTime::default()
    }
}

impl Decode for NaiveDateTime {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        let is_zero = self.is_empty_value();
        decode_with(
            self,
            &decoder,
            is_zero,
            |moment, _| Some(moment),
            NaiveDateTime::default,
        )
    }
}

impl Encode for NaiveDate {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.zeroable(self.is_empty_value(), || {
            let mut out = String::with_capacity(10);
            write_date(&mut out, *self);
            out
        })
    }

    fn is_empty_value(&self) -> bool {
        *self == NaiveDate::default()
    }
}

impl Decode for NaiveDate {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        let is_zero = self.is_empty_value();
        decode_with(
            self,
            &decoder,
            is_zero,
            |moment, _| Some(moment.date()),
            NaiveDate::default,
        )
    }
}

impl Encode for NaiveTime {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.zeroable(self.is_empty_value(), || {
            let mut out = String::with_capacity(18);
            write_time(&mut out, *self);
            out
        })
    }

    fn is_empty_value(&self) -> bool {
        *self == NaiveTime::MIN
    }
}

impl Decode for NaiveTime {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        let is_zero = self.is_empty_value();
        decode_with(
            self,
            &decoder,
            is_zero,
            |moment, _| Some(moment.time()),
            || NaiveTime::MIN,
        )
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn moment(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn three_forms() {
        let utc = Some(utc());
        assert_eq!(
            format_moment(moment("0000-01-01 15:04:05.5"), utc),
            "15:04:05.5Z"
        );
        assert_eq!(format_moment(moment("2006-12-01 00:00:00"), utc), "2006-12-01");
        assert_eq!(
            format_moment(moment("2013-10-01 07:05:34.000000088"), utc),
            "2013-10-01T07:05:34.000000088Z"
        );
        let east = FixedOffset::east_opt(5 * 3600 + 30 * 60);
        assert_eq!(
            format_moment(moment("2013-10-01 07:05:34"), east),
            "2013-10-01T07:05:34+05:30"
        );
        assert_eq!(format_moment(moment("2013-10-01 07:05:34"), None), "2013-10-01T07:05:34");
    }

    #[test]
    fn parse_forms() {
        let (m, offset) = parse_moment("2013-10-01T07:05:34.000000088Z").unwrap();
        assert_eq!(m, moment("2013-10-01 07:05:34.000000088"));
        assert_eq!(offset, Some(utc()));

        let (m, offset) = parse_moment("2006-12-01").unwrap();
        assert_eq!(m, moment("2006-12-01 00:00:00"));
        assert_eq!(offset, None);

        let (m, offset) = parse_moment("15:04:05.5-07:00").unwrap();
        assert_eq!(m, moment("0000-01-01 15:04:05.5"));
        assert_eq!(offset, FixedOffset::west_opt(7 * 3600));

        let (m, _) = parse_moment("09:30").unwrap();
        assert_eq!(m.time(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());

        assert!(parse_moment("yesterday").is_none());
    }

    #[test]
    fn zone_offsets_are_bounded() {
        assert_eq!(parse_offset("+05:30"), FixedOffset::east_opt(5 * 3600 + 30 * 60));
        assert_eq!(parse_offset("+999999:00"), None);
        assert_eq!(parse_offset("-24:00"), None);
        assert_eq!(parse_offset("+01:60"), None);
        assert!(parse_moment("00:00+999999:00").is_none());
    }
}
