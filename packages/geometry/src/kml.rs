//! Placemark extraction from KML documents.
//!
//! Only the parts of KML that e-Stat boundary files use are understood:
//! `Placemark` elements carrying `SimpleData` attributes and one or more
//! `Polygon` geometries with outer and inner `LinearRing` boundaries.
//! Element names are matched without their namespace prefix.

use std::collections::BTreeMap;

use geojson::{PolygonType, Position};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Minimum number of positions in a closed ring.
pub const MIN_RING_LEN: usize = 4;

/// A decoded KML placemark.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placemark {
    /// `SimpleData` values keyed by their `name` attribute, trimmed.
    pub attributes: BTreeMap<String, String>,
    /// Polygons with a valid outer ring, in document order.
    pub polygons: Vec<PolygonType>,
}

impl Placemark {
    /// Trimmed attribute value, or `""`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> &str {
        self.attributes.get(name).map_or("", String::as_str)
    }
}

/// Parses a whitespace-separated list of `lon,lat[,alt]` tuples into a
/// closed ring.
///
/// Tuples with fewer than two components or unparseable numbers are
/// skipped. Altitude is discarded. The ring is closed by repeating the
/// first position when needed.
#[must_use]
pub fn parse_coordinates(text: &str) -> Vec<Position> {
    let mut ring: Vec<Position> = text
        .split_whitespace()
        .filter_map(|token| {
            let mut parts = token.split(',');
            let lon = parts.next()?.parse::<f64>().ok()?;
            let lat = parts.next()?.parse::<f64>().ok()?;
            Some(vec![lon, lat])
        })
        .collect();

    let closing = match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if first != last => Some(first.clone()),
        _ => None,
    };
    ring.extend(closing);
    ring
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Outer,
    Inner,
}

#[derive(Debug, Default)]
struct PolygonRings {
    outer: Option<Vec<Position>>,
    inner: Vec<Vec<Position>>,
}

impl PolygonRings {
    fn add_ring(&mut self, boundary: Option<Boundary>, ring: Vec<Position>) {
        match boundary {
            Some(Boundary::Outer) if self.outer.is_none() => self.outer = Some(ring),
            Some(Boundary::Inner) if ring.len() >= MIN_RING_LEN => self.inner.push(ring),
            _ => {}
        }
    }

    fn finish(self) -> Option<PolygonType> {
        let outer = self.outer.filter(|ring| ring.len() >= MIN_RING_LEN)?;
        let mut rings = Vec::with_capacity(1 + self.inner.len());
        rings.push(outer);
        rings.extend(self.inner);
        Some(rings)
    }
}

/// What the parser is currently collecting text for.
enum Capture {
    None,
    SimpleData { name: String, text: String },
    Coordinates(String),
}

#[derive(Default)]
struct PlacemarkState {
    placemark: Placemark,
    polygon: Option<PolygonRings>,
    boundary: Option<Boundary>,
}

fn name_attribute(element: &BytesStart<'_>) -> Result<String, quick_xml::Error> {
    Ok(match element.try_get_attribute("name")? {
        Some(attr) => attr.unescape_value()?.trim().to_string(),
        None => String::new(),
    })
}

/// Extracts every placemark from a KML document.
///
/// Placemarks are returned in document order, including those without
/// any valid polygon.
///
/// # Errors
///
/// Returns an error if the document is not well-formed XML.
pub fn parse_placemarks(kml: &str) -> Result<Vec<Placemark>, quick_xml::Error> {
    let mut reader = Reader::from_str(kml);
    let mut placemarks = Vec::new();
    let mut current: Option<PlacemarkState> = None;
    let mut capture = Capture::None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => match element.local_name().as_ref() {
                b"Placemark" => current = Some(PlacemarkState::default()),
                b"Polygon" => {
                    if let Some(state) = current.as_mut() {
                        state.polygon = Some(PolygonRings::default());
                    }
                }
                b"outerBoundaryIs" => {
                    if let Some(state) = current.as_mut() {
                        state.boundary = Some(Boundary::Outer);
                    }
                }
                b"innerBoundaryIs" => {
                    if let Some(state) = current.as_mut() {
                        state.boundary = Some(Boundary::Inner);
                    }
                }
                b"SimpleData" if current.is_some() => {
                    capture = Capture::SimpleData {
                        name: name_attribute(&element)?,
                        text: String::new(),
                    };
                }
                b"coordinates" if current.is_some() => {
                    capture = Capture::Coordinates(String::new());
                }
                _ => {}
            },
            Event::Empty(element) => {
                if element.local_name().as_ref() == b"SimpleData"
                    && let Some(state) = current.as_mut()
                {
                    let name = name_attribute(&element)?;
                    state.placemark.attributes.insert(name, String::new());
                }
            }
            Event::Text(text) => match &mut capture {
                Capture::SimpleData { text: buf, .. } | Capture::Coordinates(buf) => {
                    buf.push_str(&text.unescape()?);
                }
                Capture::None => {}
            },
            Event::CData(data) => match &mut capture {
                Capture::SimpleData { text: buf, .. } | Capture::Coordinates(buf) => {
                    buf.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
                Capture::None => {}
            },
            Event::End(element) => match element.local_name().as_ref() {
                b"Placemark" => {
                    if let Some(state) = current.take() {
                        placemarks.push(state.placemark);
                    }
                }
                b"Polygon" => {
                    if let Some(state) = current.as_mut()
                        && let Some(rings) = state.polygon.take()
                        && let Some(polygon) = rings.finish()
                    {
                        state.placemark.polygons.push(polygon);
                    }
                }
                b"outerBoundaryIs" | b"innerBoundaryIs" => {
                    if let Some(state) = current.as_mut() {
                        state.boundary = None;
                    }
                }
                b"SimpleData" => {
                    if let (Capture::SimpleData { name, text }, Some(state)) =
                        (std::mem::replace(&mut capture, Capture::None), current.as_mut())
                    {
                        state
                            .placemark
                            .attributes
                            .insert(name, text.trim().to_string());
                    }
                }
                b"coordinates" => {
                    if let (Capture::Coordinates(text), Some(state)) =
                        (std::mem::replace(&mut capture, Capture::None), current.as_mut())
                    {
                        let boundary = state.boundary;
                        if let Some(polygon) = state.polygon.as_mut() {
                            polygon.add_ring(boundary, parse_coordinates(&text));
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(placemarks)
}
