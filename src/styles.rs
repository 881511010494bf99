//! Marker style definitions and the category-to-style lookup.
//!
//! Every logical style expands into a normal/highlight `Style` pair plus a
//! `StyleMap` joining them, matching how Google My Maps exports its icons.
//! The catalog is built once per run and never mutated by search results.

/// Icon used by every style; the color tints it.
const ICON_HREF: &str =
    "https://www.gstatic.com/mapspro/images/stock/503-wht-blank_maps.png";

const BAR_STYLE_ID: &str = "icon-1879-0F9D58-nodesc";
const ICE_CREAM_STYLE_ID: &str = "icon-1607-0288D1-nodesc";
const FOOD_STYLE_ID: &str = "icon-1577-0F9D58-nodesc";

/// One concrete KML `<Style>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Element id, e.g. `icon-1879-0F9D58-nodesc-normal`.
    pub id: String,
    /// Icon color in KML aabbggrr hex.
    pub color: &'static str,
    pub icon_href: &'static str,
}

/// A KML `<StyleMap>` pairing a normal and a highlight style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleMap {
    pub id: String,
    pub normal_url: String,
    pub highlight_url: String,
}

/// Fixed mapping from place category tags to style references, with a
/// generic food style as the fallback for everything unrecognized.
///
/// The rules are an ordered list scanned first-match against a record's
/// category tags, so tag order in the record decides ties.
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    rules: Vec<(&'static str, String)>,
    fallback: String,
    styles: Vec<Style>,
    style_maps: Vec<StyleMap>,
}

impl StyleCatalog {
    /// Builds the default catalog: dedicated styles for bars and ice cream
    /// shops, generic food for everything else.
    pub fn new() -> Self {
        let mut styles = Vec::new();
        let mut style_maps = Vec::new();
        let mut add = |id: &str, color: &'static str| {
            styles.push(Style {
                id: format!("{id}-normal"),
                color,
                icon_href: ICON_HREF,
            });
            styles.push(Style {
                id: format!("{id}-highlight"),
                color,
                icon_href: ICON_HREF,
            });
            style_maps.push(StyleMap {
                id: id.to_string(),
                normal_url: format!("#{id}-normal"),
                highlight_url: format!("#{id}-highlight"),
            });
            format!("#{id}")
        };

        let ice_cream_url = add(ICE_CREAM_STYLE_ID, "ffd18802");
        let bar_url = add(BAR_STYLE_ID, "ff589d0f");
        let food_url = add(FOOD_STYLE_ID, "ff589d0f");

        StyleCatalog {
            rules: vec![("bar", bar_url), ("ice_cream_shop", ice_cream_url)],
            fallback: food_url,
            styles,
            style_maps,
        }
    }

    /// Resolves a style reference for a record's category tags: the first
    /// tag with a catalog rule wins; no match falls through to the generic
    /// food style.
    pub fn style_for<S: AsRef<str>>(&self, tags: &[S]) -> &str {
        for tag in tags {
            for (rule_tag, url) in &self.rules {
                if *rule_tag == tag.as_ref() {
                    return url;
                }
            }
        }
        &self.fallback
    }

    /// Static style and style-map definitions, embedded once per document.
    pub fn definitions(&self) -> (&[Style], &[StyleMap]) {
        (&self.styles, &self.style_maps)
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        StyleCatalog::new()
    }
}
