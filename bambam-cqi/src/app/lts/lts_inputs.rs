use crate::model::network::SegmentTags;

/// cycleway values counted as a bike lane for traffic stress. matching is
/// case sensitive apart from the spellings of `yes` listed here.
pub const BIKE_LANE_VALUES: [&str; 5] = ["yes", "Yes", "YES", "lane", "track"];

/// the road attributes read by the traffic stress estimate. speed and lane
/// count are None when the tag is missing or not a plain number.
#[derive(Debug, Clone, PartialEq)]
pub struct LtsInputs {
    pub functional_class: Option<String>,
    pub has_bike_lane: bool,
    pub speed_limit: Option<f64>,
    pub lane_count: Option<u32>,
}

impl LtsInputs {
    pub fn from_tags(tags: &SegmentTags) -> LtsInputs {
        let has_bike_lane = tags
            .cycleway
            .as_deref()
            .map(|v| BIKE_LANE_VALUES.contains(&v))
            .unwrap_or_default();
        // only the leading token counts, and only when it is all digits
        let speed_limit = tags
            .maxspeed
            .as_deref()
            .and_then(|v| v.split_whitespace().next())
            .filter(|token| token.chars().all(|c| c.is_ascii_digit()))
            .and_then(|token| token.parse::<f64>().ok());
        let lane_count = tags
            .lanes
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
            .and_then(|v| v.parse::<u32>().ok());
        LtsInputs {
            functional_class: tags.highway.clone(),
            has_bike_lane,
            speed_limit,
            lane_count,
        }
    }

    /// posted speed, or the default for the functional class
    pub fn speed_or_default(&self) -> f64 {
        self.speed_limit.unwrap_or(match self.functional_class.as_deref() {
            Some("residential") => 25.0,
            Some("tertiary") => 30.0,
            Some("secondary") => 35.0,
            Some("primary") => 40.0,
            Some("trunk") => 45.0,
            _ => 35.0,
        })
    }

    /// lane count, or the default for the functional class
    pub fn lanes_or_default(&self) -> u32 {
        self.lane_count.unwrap_or(match self.functional_class.as_deref() {
            Some("residential") | Some("tertiary") => 2,
            Some("secondary") => 3,
            Some("primary") | Some("trunk") => 4,
            _ => 3,
        })
    }
}
