use crate::{bridge::GpsBridge, types::FixQuality};

/// Key prefix of the GPS info channel the application queries.
pub const GPS_INFO_CHANNEL: &str = "teleferika.app/gps_info";

pub const METHOD_GET_SATELLITE_COUNT: &str = "getSatelliteCount";
pub const METHOD_GET_FIX_QUALITY: &str = "getFixQuality";

/// Outcome of a method call. `Value(None)` means "no data"/"indeterminate"
/// and is a normal reply, as is `NotImplemented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodResponse {
    Value(Option<i32>),
    NotImplemented,
}

pub fn dispatch(bridge: &GpsBridge, method: &str) -> MethodResponse {
    match method {
        METHOD_GET_SATELLITE_COUNT => {
            MethodResponse::Value(bridge.satellite_count().map(|count| count as i32))
        }
        METHOD_GET_FIX_QUALITY => {
            MethodResponse::Value(bridge.fix_quality().map(FixQuality::code))
        }
        _ => MethodResponse::NotImplemented,
    }
}

/// The method name is the last chunk of the query's key expression.
pub fn method_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
