//! Field extractors for listing and detail pages.
//!
//! Every extractor runs independently against a parsed [`Page`] and returns
//! an [`Option`] or an empty list when its markup is absent or malformed.
//! Nothing here fails: a missing field is recorded as unknown and the other
//! fields are still read.

use std::sync::LazyLock;

use regex::Regex;
use series_tv_scraper::html::{Page, Region};
use series_tv_series_models::Series;
use series_tv_table::normalize::parse_rating;

use crate::config::ListingSite;

const LISTING_ITEM: &str = "li.mdl";
const LISTING_LINK: &str = "a.meta-title-link";
const META_BODY: &str = "div.meta-body";
const META_INFO: &str = "div.meta-body-info";
const GENRE_LINKS: &str = "a.dark-grey-link, span.dark-grey-link";
const ORIGINAL_TITLE: &str = "div.meta-body-original-title strong";
const STATS_ITEMS: &str = "div.stats-numbers-seriespage div.stats-item";
const RATING: &str = ".stareval-note";
const PROVIDERS: &str = "div.provider-tile-primary";
const DETAIL_TITLE: &str = "div.titlebar-title";

static AIR_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})\b(?:\s*-\s*(?:(\d{4})\b)?)?").unwrap_or_else(|_| unreachable!())
});

/// Reads the `(link, title)` pairs of one listing page, in document order.
///
/// Containers without a title link are skipped. Links are resolved against
/// the site root.
#[must_use]
pub fn listing_entries(page: &Page, site: &ListingSite) -> Vec<Series> {
    page.select_all(LISTING_ITEM)
        .into_iter()
        .filter_map(|item| {
            let anchor = item.select_first(LISTING_LINK)?;
            let href = anchor.attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let Some(link) = site.resolve(href) else {
                log::debug!("Skipping unresolvable listing href '{href}'");
                return None;
            };
            let title = Some(anchor.text()).filter(|t| !t.is_empty());
            Some(Series::new(link, title))
        })
        .collect()
}

/// Fills every detail attribute of `series` from its parsed detail page.
///
/// The link is never touched; the listing title is kept when present.
pub fn apply_detail(series: &mut Series, page: &Page) {
    let body = page.select_first(META_BODY);
    let info = body.and_then(|body| body.select_first(META_INFO));

    series.genres = info.map(genres).unwrap_or_default();
    series.title_original = body.and_then(title_original);

    let (seasons, episodes) = season_and_episode_counts(page);
    series.season_count = seasons;
    series.episode_count = episodes;

    let (start, end) = info.map_or((None, None), |info| parse_air_years(&info.text()));
    series.air_year_start = start;
    series.air_year_end = end;

    series.rating = rating(page);
    series.available_on = available_on(page);

    if series.title.is_none() {
        series.title = page
            .select_first(DETAIL_TITLE)
            .map(|t| t.text())
            .filter(|t| !t.is_empty());
    }
}

/// Genre labels inside the info block, in document order.
#[must_use]
pub fn genres(info: Region<'_>) -> Vec<String> {
    info.select_all(GENRE_LINKS)
        .iter()
        .map(Region::text)
        .filter(|g| !g.is_empty())
        .collect()
}

/// The original-language title inside the meta body block.
#[must_use]
pub fn title_original(body: Region<'_>) -> Option<String> {
    body.select_first(ORIGINAL_TITLE)
        .map(|strong| strong.text())
        .filter(|t| !t.is_empty())
}

/// Reads the season and episode counts from the first two stats items.
///
/// The items are positional: the first holds seasons, the second episodes.
/// An item that does not parse leaves only its own count unknown.
#[must_use]
pub fn season_and_episode_counts(page: &Page) -> (Option<u32>, Option<u32>) {
    let items = page.select_all(STATS_ITEMS);
    let count_at = |index: usize| {
        items
            .get(index)
            .and_then(|item| parse_count_token(&item.text()))
    };
    (count_at(0), count_at(1))
}

/// Parses `"<integer> <word...>"`, e.g. `"3 temporadas"`.
///
/// A bare integer with no word after it is rejected.
#[must_use]
pub fn parse_count_token(text: &str) -> Option<u32> {
    let mut tokens = text.split_whitespace();
    let count = tokens.next()?.parse().ok()?;
    tokens.next()?;
    Some(count)
}

/// Finds the first `YYYY`, `YYYY - YYYY` or `YYYY - ` in `text`.
///
/// Returns `(start, end)`; the end year is `None` for an open range or a
/// single year.
#[must_use]
pub fn parse_air_years(text: &str) -> (Option<i32>, Option<i32>) {
    let Some(caps) = AIR_YEARS.captures(text) else {
        return (None, None);
    };
    let year = |index: usize| caps.get(index).and_then(|m| m.as_str().parse().ok());
    (year(1), year(2))
}

#[must_use]
pub fn rating(page: &Page) -> Option<f64> {
    page.select_first(RATING)
        .and_then(|note| parse_rating(&note.text()))
}

/// Streaming services offering the series, in page order.
#[must_use]
pub fn available_on(page: &Page) -> Vec<String> {
    page.select_all(PROVIDERS)
        .iter()
        .map(Region::text)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A listing page with the given `(href, title)` entries.
    pub fn listing_html(entries: &[(&str, &str)]) -> String {
        let items: String = entries
            .iter()
            .map(|(href, title)| {
                format!(
                    r#"<li class="mdl"><div class="card"><h2 class="meta-title"><a class="meta-title-link" href="{href}">{title}</a></h2></div></li>"#
                )
            })
            .collect();
        format!("<html><body><ul>{items}</ul></body></html>")
    }

    /// A detail page with the given genres, air years text, rating and
    /// providers.
    pub fn detail_html(genres: &[&str], years: &str, rating: &str, providers: &[&str]) -> String {
        let genre_links: String = genres
            .iter()
            .map(|g| format!(r#"<span class="dark-grey-link">{g}</span>, "#))
            .collect();
        let provider_tiles: String = providers
            .iter()
            .map(|p| format!(r#"<div class="provider-tile-primary"> {p} </div>"#))
            .collect();
        format!(
            r#"<html><body>
            <div class="titlebar-title">Detail Title</div>
            <div class="meta-body">
              <div class="meta-body-item meta-body-info">{years} | 45 min | {genre_links}</div>
              <div class="meta-body-original-title">Título original <strong>Original Name</strong></div>
            </div>
            <div class="stats-numbers-seriespage">
              <div class="stats-item">3 Temporadas</div>
              <div class="stats-item">24 Episodios</div>
            </div>
            <div class="rating-item"><span class="stareval-note">{rating}</span></div>
            {provider_tiles}
            </body></html>"#
        )
    }
}
