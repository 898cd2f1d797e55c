use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

const IMAGE_EXTS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

/// Which source attributes are read and whether results are filtered.
///
/// Two mobile variants of the app disagree here. Both behaviors are kept as
/// configurations rather than merged into one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPolicy {
    /// Reads `img[src]` and `source[srcset]`, keeps only URLs whose path
    /// names a known image extension. Lazy-load attributes are scanned only
    /// when that pass finds nothing.
    #[default]
    StrictExtensionFiltered,
    /// Reads the primary attribute of each element, or its lazy-load
    /// attribute when the primary one is missing or empty. No filtering.
    /// When nothing resolves, lazy-load attributes are rescanned on their own
    /// so placeholder `src` values do not hide them.
    PermissiveLazyFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrPass {
    Primary,
    Lazy,
    PrimaryThenLazy,
}

/// Collects candidate image URLs from `html` in document order, resolved
/// against `page_url`. Duplicates are kept.
pub fn extract_image_urls(html: &str, page_url: &str, policy: ExtractionPolicy) -> Vec<String> {
    let base_url = match Url::parse(page_url) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };
    let document = Html::parse_document(html);

    match policy {
        ExtractionPolicy::StrictExtensionFiltered => {
            let primary = collect_urls(&document, &base_url, AttrPass::Primary, true);
            if !primary.is_empty() {
                return primary;
            }
            collect_urls(&document, &base_url, AttrPass::Lazy, true)
        }
        ExtractionPolicy::PermissiveLazyFallback => {
            let mixed = collect_urls(&document, &base_url, AttrPass::PrimaryThenLazy, false);
            if !mixed.is_empty() {
                return mixed;
            }
            collect_urls(&document, &base_url, AttrPass::Lazy, false)
        }
    }
}

fn collect_urls(document: &Html, base_url: &Url, pass: AttrPass, filtered: bool) -> Vec<String> {
    let selector = Selector::parse("img, source").expect("image selector");
    let mut out = Vec::new();

    for element in document.select(&selector) {
        let tokens = match element.value().name() {
            "img" => pick_attr(&element, "src", "data-src", pass)
                .map(|raw| vec![raw])
                .unwrap_or_default(),
            _ => pick_attr(&element, "srcset", "data-srcset", pass)
                .map(split_srcset)
                .unwrap_or_default(),
        };

        for token in tokens {
            let Some(resolved) = resolve_candidate(token, base_url) else {
                continue;
            };
            if filtered && !has_image_extension(&resolved) {
                continue;
            }
            out.push(resolved);
        }
    }
    out
}

fn pick_attr<'a>(
    element: &ElementRef<'a>,
    primary: &str,
    lazy: &str,
    pass: AttrPass,
) -> Option<&'a str> {
    let value = element.value();
    match pass {
        AttrPass::Primary => value.attr(primary),
        AttrPass::Lazy => value.attr(lazy),
        AttrPass::PrimaryThenLazy => value
            .attr(primary)
            .filter(|raw| !raw.trim().is_empty())
            .or_else(|| value.attr(lazy)),
    }
}

/// One entry per comma-separated candidate; width/density descriptors are
/// dropped, not interpreted.
fn split_srcset(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|chunk| chunk.split_whitespace().next())
        .collect()
}

/// Resolves one attribute token against the page URL.
///
/// Only absolute `http`/`https` URLs with a host survive; `data:`,
/// `javascript:` and other schemes resolve to something else and are dropped.
/// Fragment-only tokens point back at the page itself and are dropped too.
/// Any fragment is stripped from the result.
fn resolve_candidate(token: &str, page_url: &Url) -> Option<String> {
    let token = token.trim();
    if token.is_empty() || token.starts_with('#') {
        return None;
    }
    let mut resolved = page_url.join(token).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") || !resolved.has_host() {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.into())
}

fn has_image_extension(url: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(v) => v,
        Err(_) => return false,
    };
    let path = parsed.path().to_ascii_lowercase();
    IMAGE_EXTS.iter().any(|ext| path.contains(ext))
}
