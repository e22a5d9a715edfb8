use geo::LineString;
use regex::Regex;
use serde::Serializer;
use std::sync::LazyLock;
use wkt::ToWkt;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// the first run of ASCII digits in a string, if any. used to read numbers out of
/// free-form tags (`30 mph` -> `30`) and identifiers (`way/123` -> `123`).
pub fn first_digit_run(s: &str) -> Option<&str> {
    DIGIT_RUN.find(s).map(|m| m.as_str())
}

/// writes a LineString as a WKT string column
pub fn serialize_linestring<S>(row: &LineString<f64>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let wkt = row.to_wkt().to_string();
    s.serialize_str(&wkt)
}

#[cfg(test)]
mod tests {
    #[test]
    fn first_digit_run_examples() {
        assert_eq!(super::first_digit_run("30 mph"), Some("30"));
        assert_eq!(super::first_digit_run("way/123"), Some("123"));
        assert_eq!(super::first_digit_run("20;30"), Some("20"));
        assert_eq!(super::first_digit_run("national"), None);
    }

    #[test]
    fn linestring_written_as_wkt_column() {
        #[derive(serde::Serialize)]
        struct Row {
            index: usize,
            #[serde(serialize_with = "super::serialize_linestring")]
            geometry: geo::LineString<f64>,
        }
        let row = Row {
            index: 3,
            geometry: geo::line_string![
                geo::coord! { x: 0.5, y: 0.0 },
                geo::coord! { x: 10.0, y: 2.0 },
            ],
        };
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&row).expect("serialize row");
        let bytes = writer.into_inner().expect("flush writer");
        let text = String::from_utf8(bytes).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("index,geometry"));
        let record = lines.next().expect("one record");
        assert!(record.starts_with("3,\"LINESTRING"), "{record}");
        assert!(record.contains("0.5 0") && record.contains("10 2"), "{record}");
    }
}
