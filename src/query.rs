//! Pose strings in a page URL, one `name=<pose>` pair per marionette.
//!
//! Pose characters never need percent-encoding, so pairs are joined and split
//! verbatim.

/// Builds `name=pose&name=pose...` in the given order.
pub fn pose_query_string(poses: &[(&str, &str)]) -> String {
    poses
        .iter()
        .map(|(name, pose)| format!("{name}={pose}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Splits a query string into `(name, pose)` pairs, keeping their order.
///
/// A leading `?` and empty segments are ignored. A segment without `=` yields
/// an empty pose, which fails later when decoded.
pub fn parse_pose_query(query: &str) -> Vec<(&str, &str)> {
    query
        .strip_prefix('?')
        .unwrap_or(query)
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
        .collect()
}

/// Pose stored for `name`, or `default` when the query has none.
pub fn pose_or_default<'a>(pairs: &[(&'a str, &'a str)], name: &str, default: &'a str) -> &'a str {
    pairs
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, pose)| *pose)
        .unwrap_or(default)
}
