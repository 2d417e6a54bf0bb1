use crate::error::{AppError, Result};
use crate::models::Coordinates;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
const GPX_CREATOR: &str = "runroute";

/// Track name shown by devices, e.g. `RunRoute - 5.2km`
pub fn track_name(distance_km: f64) -> String {
    format!("RunRoute - {:.1}km", distance_km)
}

/// Export a path as a GPX 1.1 document with a single track segment.
pub fn export_gpx(path: &[Coordinates], distance_km: f64, created_at: OffsetDateTime) -> Result<String> {
    if path.is_empty() {
        return Err(AppError::Export("Route has no coordinates".to_string()));
    }

    let name = track_name(distance_km);
    let timestamp = created_at
        .format(&Rfc3339)
        .map_err(|e| AppError::Export(e.to_string()))?;

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("gpx");
    root.push_attribute(("version", "1.1"));
    root.push_attribute(("creator", GPX_CREATOR));
    root.push_attribute(("xmlns", GPX_NAMESPACE));
    write(&mut writer, Event::Start(root))?;

    write(&mut writer, Event::Start(BytesStart::new("metadata")))?;
    write_element(&mut writer, "name", &name)?;
    write_element(&mut writer, "time", &timestamp)?;
    write(&mut writer, Event::End(BytesEnd::new("metadata")))?;

    write(&mut writer, Event::Start(BytesStart::new("trk")))?;
    write_element(&mut writer, "name", &name)?;
    write(&mut writer, Event::Start(BytesStart::new("trkseg")))?;

    for point in path {
        let mut trkpt = BytesStart::new("trkpt");
        trkpt.push_attribute(("lat", point.lat.to_string().as_str()));
        trkpt.push_attribute(("lon", point.lng.to_string().as_str()));
        write(&mut writer, Event::Empty(trkpt))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("trkseg")))?;
    write(&mut writer, Event::End(BytesEnd::new("trk")))?;
    write(&mut writer, Event::End(BytesEnd::new("gpx")))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
}

fn write<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| AppError::Export(e.to_string()))
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_time() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn test_gpx_document_structure() {
        let path = vec![
            Coordinates::new(35.6812, 139.7671).unwrap(),
            Coordinates::new(35.6852, 139.7528).unwrap(),
            Coordinates::new(35.6812, 139.7671).unwrap(),
        ];
        let gpx = export_gpx(&path, 5.24, sample_time()).unwrap();

        assert!(gpx.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(gpx.contains(r#"<gpx version="1.1" creator="runroute" xmlns="http://www.topografix.com/GPX/1/1">"#));
        assert_eq!(gpx.matches("<name>RunRoute - 5.2km</name>").count(), 2);
        assert!(gpx.contains("<time>2023-11-14T22:13:20Z</time>"));
        assert_eq!(gpx.matches("<trkpt ").count(), 3);
        assert!(gpx.contains(r#"<trkpt lat="35.6852" lon="139.7528"/>"#));
        assert!(gpx.trim_end().ends_with("</gpx>"));
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(matches!(
            export_gpx(&[], 1.0, sample_time()),
            Err(AppError::Export(_))
        ));
    }

    #[test]
    fn test_track_name_rounds_to_one_decimal() {
        assert_eq!(track_name(4.96), "RunRoute - 5.0km");
        assert_eq!(track_name(10.0), "RunRoute - 10.0km");
    }
}
