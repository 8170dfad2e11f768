use serde::{Deserialize, Serialize};
use url::Url;

use crate::feed::Article;

/// Record of the path variant, consumed by site cards that link to
/// `{origin}{path}` and show an emoji and like count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathArticle {
    pub title: String,
    pub url: String,
    pub path: String,
    pub emoji: String,
    pub liked_count: u64,
    pub published_at: String,
    pub summary: String,
}

/// `url` with the site `origin` removed: `https://zenn.dev/u/articles/x`
/// becomes `/u/articles/x`.
///
/// The comparison is on parsed origins, so a trailing slash on `origin` or a
/// different host case does not matter. A URL on any other origin, or one
/// that does not parse, is returned unchanged.
pub fn derive_path(url: &str, origin: &str) -> String {
    let (Ok(article), Ok(site)) = (Url::parse(url), Url::parse(origin)) else {
        return url.to_string();
    };
    if article.origin() != site.origin() {
        return url.to_string();
    }

    let mut path = article.path().to_string();
    if let Some(query) = article.query() {
        path.push('?');
        path.push_str(query);
    }
    if let Some(fragment) = article.fragment() {
        path.push('#');
        path.push_str(fragment);
    }
    path
}

/// Converts articles into path-variant records. `emoji` and `liked_count`
/// are constants: the feed carries neither.
pub fn to_path_records(articles: Vec<Article>, origin: &str, emoji: &str) -> Vec<PathArticle> {
    articles
        .into_iter()
        .map(|a| {
            let path = derive_path(&a.url, origin);
            if path == a.url {
                tracing::warn!(url = %a.url, origin = %origin, "Article URL is outside the site origin, keeping full URL as path");
            }
            PathArticle {
                title: a.title,
                path,
                url: a.url,
                emoji: emoji.to_string(),
                liked_count: 0,
                published_at: a.published_at,
                summary: a.summary,
            }
        })
        .collect()
}
