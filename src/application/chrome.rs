use crate::config::SiteSettings;
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationView, PageMetaView,
};

/// Top-level sections in navigation order.
const SECTIONS: [(&str, &str); 8] = [
    ("Home", "/"),
    ("About", "/about/"),
    ("Menu", "/menu/"),
    ("Team", "/team/"),
    ("Testimonials", "/testimonials/"),
    ("Blog", "/blog/"),
    ("Newsletter", "/newsletter/"),
    ("Contact", "/contact/"),
];

/// Builds the shared page chrome from the `[site]` settings.
#[derive(Clone)]
pub struct ChromeService {
    brand_title: String,
    tagline: String,
    footer_copy: String,
    public_url: String,
}

impl ChromeService {
    pub fn new(site: &SiteSettings) -> Self {
        Self {
            brand_title: site.brand_title.clone(),
            tagline: site.tagline.clone(),
            footer_copy: site.footer_copy.clone(),
            public_url: site.public_url.clone(),
        }
    }

    /// Chrome for a page at `path`, titled `title`. The navigation entry
    /// whose section contains `path` is marked active.
    pub fn load(&self, path: &str, title: &str) -> LayoutChrome {
        let entries = SECTIONS
            .iter()
            .map(|(label, href)| NavigationLinkView {
                label: (*label).to_string(),
                href: (*href).to_string(),
                is_active: section_contains(href, path),
            })
            .collect();

        let page_title = if title.is_empty() {
            self.brand_title.clone()
        } else {
            format!("{title} | {}", self.brand_title)
        };

        LayoutChrome {
            brand: BrandView {
                title: self.brand_title.clone(),
                tagline: self.tagline.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView { entries },
            footer: FooterView {
                copy: self.footer_copy.clone(),
            },
            meta: PageMetaView {
                title: page_title,
                description: self.tagline.clone(),
                canonical: format!("{}{path}", self.public_url),
            },
        }
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }
}

fn section_contains(section: &str, path: &str) -> bool {
    if section == "/" {
        return path == "/";
    }
    path.starts_with(section)
        || (section == "/menu/" && (path.starts_with("/dish/") || path.starts_with("/dishes/")))
        || (section == "/about/" && path.starts_with("/feature"))
}
