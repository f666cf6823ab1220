//! Content management for markdown-based pages and news posts.
//!
//! This module loads markdown files from the `/content` directory at startup,
//! parses frontmatter metadata, and renders markdown to HTML. Static pages
//! (about, terms) live under `content/pages/`; news posts under
//! `content/news/` with a `YYYY-MM-DD-` filename prefix.

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Metadata for static pages (about, terms, etc.)
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// Metadata for news posts
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// A rendered news post with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

/// Content store that holds all loaded content in memory
#[derive(Debug, Clone)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
    posts: Arc<Vec<Post>>,
}

impl ContentStore {
    /// Load all content from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the content directory cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let pages = Self::load_pages(&content_dir.join("pages"))?;
        let posts = Self::load_posts(&content_dir.join("news"))?;

        Ok(Self {
            pages: Arc::new(pages),
            posts: Arc::new(posts),
        })
    }

    /// Load all pages from the pages directory
    fn load_pages(dir: &Path) -> Result<HashMap<String, Page>, ContentError> {
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(pages);
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_page(&path) {
                    Ok(page) => {
                        tracing::info!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(pages)
    }

    /// Load a single page from a markdown file
    fn load_page(path: &Path) -> Result<Page, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
            .to_string();

        let matter = Matter::<YAML>::new();
        let parsed: ParsedEntity<PageMeta> = matter
            .parse(&content)
            .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
        let meta = parsed
            .data
            .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

        let content_html = render_markdown(&parsed.content);

        Ok(Page {
            slug,
            meta,
            content_html,
        })
    }

    /// Load all news posts from the news directory
    fn load_posts(dir: &Path) -> Result<Vec<Post>, ContentError> {
        let mut posts = Vec::new();

        if !dir.exists() {
            tracing::info!("News directory does not exist yet: {:?}", dir);
            return Ok(posts);
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_post(&path) {
                    Ok(post) => {
                        tracing::info!("Loaded post: {}", post.slug);
                        posts.push(post);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load post {:?}: {}", path, e);
                    }
                }
            }
        }

        // Sort posts by published date (newest first)
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));

        Ok(posts)
    }

    /// Load a single news post from a markdown file
    fn load_post(path: &Path) -> Result<Post, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        // Extract slug from filename (e.g., "2026-01-15-term-dates.md" -> "term-dates")
        let filename = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?;

        let slug = strip_date_prefix(filename).to_string();

        let matter = Matter::<YAML>::new();
        let parsed: ParsedEntity<PostMeta> = matter
            .parse(&content)
            .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
        let meta = parsed
            .data
            .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

        let content_html = render_markdown(&parsed.content);
        let reading_time_minutes = estimate_reading_time(&parsed.content);

        Ok(Post {
            slug,
            meta,
            content_html,
            reading_time_minutes,
        })
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Get a news post by slug
    #[must_use]
    pub fn get_post(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// Get all published news posts (excludes drafts), newest first
    pub fn get_published_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.meta.draft)
    }

    /// Get recent published posts for the home page
    #[must_use]
    pub fn get_recent_posts(&self, limit: usize) -> Vec<&Post> {
        self.get_published_posts().take(limit).collect()
    }
}

/// Strip a leading `YYYY-MM-DD-` date prefix from a filename, if present.
fn strip_date_prefix(filename: &str) -> &str {
    let has_date_prefix = filename.len() > 11
        && filename
            .chars()
            .take(10)
            .enumerate()
            .all(|(i, c)| match i {
                4 | 7 => c == '-',
                _ => c.is_ascii_digit(),
            })
        && filename.chars().nth(10) == Some('-');

    if has_date_prefix {
        filename.get(11..).unwrap_or(filename)
    } else {
        filename
    }
}

/// Estimate reading time at 200 words per minute, minimum 1 minute.
fn estimate_reading_time(content: &str) -> u32 {
    let word_count = content.split_whitespace().count();
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let minutes = ((word_count as f32) / 200.0).ceil() as u32;
    minutes.max(1)
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    // Render options
    options.render.r#unsafe = true; // Allow raw HTML in markdown

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_date_prefix() {
        assert_eq!(strip_date_prefix("2026-01-15-term-dates"), "term-dates");
        assert_eq!(strip_date_prefix("no-date-here"), "no-date-here");
        assert_eq!(strip_date_prefix("2026-01-15"), "2026-01-15");
        assert_eq!(strip_date_prefix("20260115-term-dates"), "20260115-term-dates");
    }

    #[test]
    fn test_estimate_reading_time_minimum_one_minute() {
        assert_eq!(estimate_reading_time("a few words"), 1);
        assert_eq!(estimate_reading_time(""), 1);
    }

    #[test]
    fn test_estimate_reading_time_rounds_up() {
        let words = "word ".repeat(250);
        assert_eq!(estimate_reading_time(&words), 2);
    }

    #[test]
    fn test_render_markdown_basic() {
        let html = render_markdown("# Heading\n\nSome **bold** text.");
        assert!(html.contains("Heading"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_markdown_gfm_table() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }
}
