//! HTML fragment rendering for blog cards.
//!
//! Rendering is pure: no I/O, same article in, same bytes out. Every value
//! that came from a source (title, tags, URLs) is escaped for the context it
//! lands in, text or double-quoted attribute.

use crate::models::{Article, ViewCount};
use crate::utils::format_thousands;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use itertools::Itertools;

/// Counts below this render as `<200` rather than the exact figure.
const LOW_VIEW_THRESHOLD: u64 = 200;

/// Human-readable publication date, e.g. `03 June 2024`.
pub fn date_display(article: &Article) -> String {
    article.published_instant().format("%d %B %Y").to_string()
}

/// View count as shown on a card, before escaping.
///
/// | Input | Output |
/// |-------|--------|
/// | `Unknown` | `""` |
/// | `Known(150)` | `"<200"` |
/// | `Known(1532)` | `"1,532"` |
pub fn view_count_display(views: ViewCount) -> String {
    match views {
        ViewCount::Unknown => String::new(),
        ViewCount::Known(n) if n < LOW_VIEW_THRESHOLD => format!("<{LOW_VIEW_THRESHOLD}"),
        ViewCount::Known(n) => format_thousands(n),
    }
}

/// One tag link per line; an empty tag list renders as an empty string.
pub fn tags_html(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| {
            format!(
                r##"                                        <a href="#" title="View all posts in {}">{}</a>"##,
                attr(tag),
                text(tag)
            )
        })
        .join("\n")
}

/// Render one article as a blog card fragment.
pub fn render_article(article: &Article) -> String {
    let views = view_count_display(article.view_count());
    let views_label = if views.is_empty() {
        String::new()
    } else {
        format!("{views} Views")
    };
    let url = attr(article.url());
    let title_attr = attr(article.title());

    format!(
        r#"
                        <div class="item post-1">
                            <div class="blog-card">
                                <div class="media-block">
                                    <div class="category">
{tags}
                                    </div>
                                    <a href="{url}">
                                        <img src="{cover}" class="size-blog-masonry-image-two-c" alt="{title_attr}" title="{title_attr}" />
                                        <div class="mask"></div>
                                    </a>
                                </div>
                                <div class="post-info">
                                    <div class="post-details">
                                      <div class="post-date">{date}</div>
                                      <div class="post-views">{views}</div>
                                    </div>
                                    <a href="{url}">
                                        <h4 class="blog-item-title">{title}</h4>
                                    </a>
                                </div>
                            </div>
                        </div>
"#,
        tags = tags_html(article.tags()),
        url = url,
        cover = attr(article.cover_image()),
        title_attr = title_attr,
        date = date_display(article),
        views = text(&views_label),
        title = text(article.title()),
    )
}

/// Render and concatenate every article, in list order.
pub fn render_articles(articles: &[Article]) -> String {
    articles.iter().map(render_article).collect()
}
