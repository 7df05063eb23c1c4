//! Row mappers: raw rows into the camelCase domain shape.
//!
//! Each model implements [`MapRow`]; the free functions here hold the
//! conversions shared by those implementations.

use flock_core::error::CoreError;
use flock_core::types::{DbId, Timestamp, UnixSeconds};
use flock_core::validation::is_valid_color;

use crate::models::record::EntityRef;
use crate::row::Row;

/// Conversion from a gateway [`Row`] into a domain object.
pub trait MapRow: Sized {
    fn map_row(row: &Row) -> Result<Self, CoreError>;
}

/// Map every row, failing on the first malformed one.
pub fn map_rows<T: MapRow>(rows: &[Row]) -> Result<Vec<T>, CoreError> {
    rows.iter().map(T::map_row).collect()
}

/// 0 is false, anything else is true.
pub fn int_to_bool(value: i64) -> bool {
    value != 0
}

pub fn to_unix_seconds(ts: Timestamp) -> UnixSeconds {
    ts.timestamp()
}

/// Wrap a nullable foreign key. A NULL key yields no reference at all rather
/// than a reference with a null id.
pub fn reference(id: Option<DbId>) -> Option<EntityRef> {
    id.map(|id| EntityRef { id })
}

/// 24-bit integer color to uppercase `#RRGGBB`.
pub fn color_to_hex(color: i64) -> String {
    format!("#{:06X}", color & 0x00FF_FFFF)
}

/// Uppercase `#RRGGBB` to its 24-bit integer. `None` if the string is not a
/// valid color.
pub fn hex_to_color(hex: &str) -> Option<i64> {
    if !is_valid_color(hex) {
        return None;
    }
    i64::from_str_radix(&hex[1..], 16).ok()
}
