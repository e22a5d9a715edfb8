use crate::model::network::{segment_ops, SegmentTags};

/// cycleway values that indicate a physically separated facility
pub const BARRIER_VALUES: [&str; 3] = ["track", "separate", "yes"];

/// the first number in the `maxspeed` tag. units are not converted, so
/// `20 mph` reads as 20.
pub fn proc_maxspeed(tags: &SegmentTags) -> Option<f64> {
    tags.maxspeed
        .as_deref()
        .and_then(segment_ops::first_digit_run)
        .and_then(|digits| digits.parse::<f64>().ok())
}

/// true when any cycleway tag names a separated facility.
pub fn has_physical_barrier(tags: &SegmentTags) -> bool {
    tags.cycleway_values().iter().flatten().any(|value| {
        let value = value.trim().to_lowercase();
        BARRIER_VALUES.contains(&value.as_str())
    })
}
