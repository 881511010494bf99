//! KML rendering of the marker set and cache persistence.
//!
//! The document layout matches a Google My Maps export: one `<Document>`
//! holding the static style and style-map definitions followed by one
//! `<Placemark>` per accepted record.

use std::fmt::{self, Write};
use std::path::Path;

use log::{info, warn};

use crate::store::ResultStore;
use crate::styles::StyleCatalog;

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Escapes text content and attribute values for XML.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the full overlay document for every marker in the store.
pub fn render(store: &ResultStore, catalog: &StyleCatalog) -> String {
    Document { store, catalog }.to_string()
}

/// The overlay document as a lazy `Display` over the store's markers.
struct Document<'a> {
    store: &'a ResultStore,
    catalog: &'a StyleCatalog,
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_into(f, self.store, self.catalog)
    }
}

fn render_into<W: Write>(out: &mut W, store: &ResultStore, catalog: &StyleCatalog) -> fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<kml xmlns="{KML_NAMESPACE}">"#)?;
    writeln!(out, "  <Document>")?;

    let (styles, style_maps) = catalog.definitions();
    for style in styles {
        writeln!(out, r#"    <Style id="{}">"#, escape(&style.id))?;
        writeln!(out, "      <IconStyle>")?;
        writeln!(out, "        <color>{}</color>", style.color)?;
        writeln!(out, "        <scale>1</scale>")?;
        writeln!(out, "        <Icon>")?;
        writeln!(out, "          <href>{}</href>", escape(style.icon_href))?;
        writeln!(out, "        </Icon>")?;
        writeln!(out, "      </IconStyle>")?;
        writeln!(out, "    </Style>")?;
    }
    for map in style_maps {
        writeln!(out, r#"    <StyleMap id="{}">"#, escape(&map.id))?;
        for (key, url) in [("normal", &map.normal_url), ("highlight", &map.highlight_url)] {
            writeln!(out, "      <Pair>")?;
            writeln!(out, "        <key>{key}</key>")?;
            writeln!(out, "        <styleUrl>{}</styleUrl>", escape(url))?;
            writeln!(out, "      </Pair>")?;
        }
        writeln!(out, "    </StyleMap>")?;
    }

    for marker in store.markers() {
        writeln!(out, "    <Placemark>")?;
        writeln!(out, "      <name>{}</name>", escape(&marker.name))?;
        writeln!(out, "      <styleUrl>{}</styleUrl>", escape(&marker.style_url))?;
        writeln!(
            out,
            "      <description>{}</description>",
            escape(&marker.description)
        )?;
        writeln!(out, "      <Point>")?;
        writeln!(
            out,
            "        <coordinates>{}</coordinates>",
            escape(&marker.coordinates)
        )?;
        writeln!(out, "      </Point>")?;
        writeln!(out, "      <ExtendedData>")?;
        for entry in &marker.data {
            writeln!(out, r#"        <Data name="{}">"#, escape(entry.name))?;
            match &entry.value {
                Some(value) => writeln!(out, "          <value>{}</value>", escape(value))?,
                None => writeln!(out, "          <value/>")?,
            }
            writeln!(out, "        </Data>")?;
        }
        writeln!(out, "      </ExtendedData>")?;
        writeln!(out, "    </Placemark>")?;
    }

    writeln!(out, "  </Document>")?;
    writeln!(out, "</kml>")?;
    Ok(())
}

/// Persists the raw-record snapshot so later runs (possibly with different
/// thresholds) start from the accumulated set. Failure is a warning only;
/// the rendered document already holds the results.
pub fn write_cache(store: &ResultStore, path: &Path) {
    match store.save(path) {
        Ok(()) => info!(
            "cached {} records to {}",
            store.record_count(),
            path.display()
        ),
        Err(e) => warn!("failed to write cache: {e:#}"),
    }
}
