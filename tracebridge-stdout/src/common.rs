use chrono::{LocalResult, TimeZone, Utc};
use serde::Serializer;
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn as_human_readable<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let duration_since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();

    match Utc.timestamp_opt(
        duration_since_epoch.as_secs() as i64,
        duration_since_epoch.subsec_nanos(),
    ) {
        LocalResult::Single(datetime) => serializer.serialize_str(
            datetime
                .format("%Y-%m-%d %H:%M:%S%.6f")
                .to_string()
                .as_ref(),
        ),
        _ => Err(serde::ser::Error::custom("Invalid Timestamp.")),
    }
}

pub(crate) fn as_unix_nano<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let nanos = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    serializer.serialize_u128(nanos)
}
