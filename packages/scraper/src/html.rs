//! Narrow read-only view over a parsed HTML document.
//!
//! Extractors only ever need three things from a page: the first descendant
//! matching a CSS selector, all descendants matching a selector, and the
//! trimmed text of an element. [`Page`] and [`Region`] expose exactly that
//! (plus attribute lookup for links) on top of the `scraper` crate.
//!
//! Selector strings are site-specific constants. An invalid selector is
//! logged and treated as matching nothing, so extractors never fail.

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML page.
///
/// Not `Send`: parse it after the fetch completes and drop it before the
/// next `.await`.
pub struct Page {
    html: Html,
}

impl Page {
    /// Parses a full HTML document. Parsing is lenient and never fails.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Returns the document's root element as a [`Region`].
    #[must_use]
    pub fn root(&self) -> Region<'_> {
        Region {
            element: self.html.root_element(),
        }
    }

    /// Returns the first element in the document matching `selector`.
    #[must_use]
    pub fn select_first(&self, selector: &str) -> Option<Region<'_>> {
        self.root().select_first(selector)
    }

    /// Returns every element in the document matching `selector`, in
    /// document order.
    #[must_use]
    pub fn select_all(&self, selector: &str) -> Vec<Region<'_>> {
        self.root().select_all(selector)
    }
}

/// An element of a [`Page`] and the subtree below it.
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    element: ElementRef<'a>,
}

impl<'a> Region<'a> {
    /// Returns the first descendant matching `selector`.
    #[must_use]
    pub fn select_first(&self, selector: &str) -> Option<Self> {
        let compiled = compile(selector)?;
        self.element
            .select(&compiled)
            .next()
            .map(|element| Self { element })
    }

    /// Returns every descendant matching `selector`, in document order.
    #[must_use]
    pub fn select_all(&self, selector: &str) -> Vec<Self> {
        let Some(compiled) = compile(selector) else {
            return Vec::new();
        };
        self.element
            .select(&compiled)
            .map(|element| Self { element })
            .collect()
    }

    /// Returns the element's text with runs of whitespace collapsed to a
    /// single space and the ends trimmed.
    #[must_use]
    pub fn text(&self) -> String {
        let raw: String = self.element.text().collect();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Returns the value of attribute `name`, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            log::warn!("Invalid CSS selector '{selector}': {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        <html><body>
          <ul>
            <li class="item"><a class="link" href="/a">  First
                item </a></li>
            <li class="item"><a class="link" href="/b">Second</a></li>
            <li class="item"><span>no link</span></li>
          </ul>
        </body></html>
    "#;

    #[test]
    fn selects_first_and_all() {
        let page = Page::parse(DOC);
        assert_eq!(page.select_all("li.item").len(), 3);

        let first = page.select_first("a.link").unwrap();
        assert_eq!(first.text(), "First item");
        assert_eq!(first.attr("href"), Some("/a"));
    }

    #[test]
    fn nested_selection_is_scoped() {
        let page = Page::parse(DOC);
        let items = page.select_all("li.item");
        assert!(items[0].select_first("a.link").is_some());
        assert!(items[2].select_first("a.link").is_none());
    }

    #[test]
    fn missing_markup_yields_nothing() {
        let page = Page::parse("<html><body></body></html>");
        assert!(page.select_first("div.absent").is_none());
        assert!(page.select_all("div.absent").is_empty());
    }

    #[test]
    fn invalid_selector_matches_nothing() {
        let page = Page::parse(DOC);
        assert!(page.select_first("li[").is_none());
        assert!(page.select_all("li[").is_empty());
    }
}
