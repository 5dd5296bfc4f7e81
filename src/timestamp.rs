use time::{
    format_description::FormatItem, macros::format_description, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

/// Persisted form of every reminder time.
pub const STORED_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

// What `<input type="datetime-local">` submits.
const FORM_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");
const FORM_FORMAT_SECONDS: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Parse a persisted `YYYY-MM-DD HH:MM:SS` value. Any other shape is an error.
pub fn parse_stored(raw: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(raw, STORED_FORMAT)
}

/// Parse a time typed by a user: the stored form, or the HTML form variants.
pub fn parse_user_input(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    [STORED_FORMAT, FORM_FORMAT_SECONDS, FORM_FORMAT]
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(raw, *fmt).ok())
}

pub fn format_stored(t: PrimitiveDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        t.year(),
        u8::from(t.month()),
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}

/// Minute precision, as shown in outgoing mail.
pub fn format_display(t: PrimitiveDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        t.year(),
        u8::from(t.month()),
        t.day(),
        t.hour(),
        t.minute()
    )
}

/// Current wall-clock time at the configured offset, without the offset attached.
pub fn wall_clock_now(utc_offset_minutes: i32) -> anyhow::Result<PrimitiveDateTime> {
    let seconds = utc_offset_minutes
        .checked_mul(60)
        .ok_or_else(|| anyhow::anyhow!("utc offset of {utc_offset_minutes} minutes overflows"))?;
    let offset = UtcOffset::from_whole_seconds(seconds)?;
    let now = OffsetDateTime::now_utc().to_offset(offset);
    Ok(PrimitiveDateTime::new(now.date(), now.time()))
}
