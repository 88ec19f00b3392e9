// ISO9660 timestamp encoding
// Directory records carry a 7-byte binary date, volume descriptors a 17-byte digit string

use super::constants::{DEC_DATETIME_LEN, RECORDING_DATE_LEN};
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

/// Encode a directory record recording date
/// Bytes: years since 1900, month, day, hour, minute, second, GMT offset (15 min units)
/// `None` encodes as all zeros, meaning "not specified"
pub fn encode_recording_date(time: Option<DateTime<Utc>>) -> [u8; RECORDING_DATE_LEN] {
    let mut out = [0u8; RECORDING_DATE_LEN];

    if let Some(time) = time {
        // Year range is checked when options are validated
        let year = (time.year() - 1900).clamp(0, u8::MAX as i32);
        out[0] = year as u8;
        out[1] = time.month() as u8;
        out[2] = time.day() as u8;
        out[3] = time.hour() as u8;
        out[4] = time.minute() as u8;
        out[5] = time.second() as u8;
        out[6] = 0; // UTC
    }

    out
}

/// Decode a 7-byte recording date, `None` when unset or invalid
pub fn decode_recording_date(raw: &[u8]) -> Option<DateTime<Utc>> {
    if raw.len() < RECORDING_DATE_LEN || raw[..6].iter().all(|&b| b == 0) {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(1900 + raw[0] as i32, raw[1] as u32, raw[2] as u32)?;
    let naive = date.and_hms_opt(raw[3] as u32, raw[4] as u32, raw[5] as u32)?;

    // Offset is signed quarter hours east of GMT
    let offset_secs = (raw[6] as i8) as i64 * 15 * 60;
    Some(naive.and_utc() - chrono::Duration::seconds(offset_secs))
}

/// Encode a volume descriptor date: "YYYYMMDDHHMMSScc" plus a GMT offset byte
pub fn encode_descriptor_date(time: Option<DateTime<Utc>>) -> [u8; DEC_DATETIME_LEN] {
    let mut out = [b'0'; DEC_DATETIME_LEN];
    out[16] = 0;

    if let Some(time) = time {
        let digits = format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}{:02}",
            time.year(),
            time.month(),
            time.day(),
            time.hour(),
            time.minute(),
            time.second(),
            time.timestamp_subsec_millis() / 10,
        );
        out[..16].copy_from_slice(&digits.as_bytes()[..16]);
    }

    out
}
