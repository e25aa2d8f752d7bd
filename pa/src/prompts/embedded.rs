//! Embedded prompts
//!
//! These are compiled into the binary from the `prompts/` directory.

use tracing::debug;

/// Repair prompt used when a structured response fails validation
pub const FIX: &str = include_str!("../../prompts/fix.md");

pub const BLOG_TITLE: &str = include_str!("../../prompts/medium_blog_post/title.md");
pub const BLOG_SELECT_TITLE: &str = include_str!("../../prompts/medium_blog_post/select_title.md");
pub const BLOG_OUTLINE: &str = include_str!("../../prompts/medium_blog_post/outline.md");
pub const BLOG_ABSTRACT: &str = include_str!("../../prompts/medium_blog_post/abstract.md");
pub const BLOG_EXAMPLES: &str = include_str!("../../prompts/medium_blog_post/concrete_examples.md");
pub const BLOG_ARTICLE: &str = include_str!("../../prompts/medium_blog_post/blog.md");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "fix" => Some(FIX),
        "medium_blog_post/title" => Some(BLOG_TITLE),
        "medium_blog_post/select_title" => Some(BLOG_SELECT_TITLE),
        "medium_blog_post/outline" => Some(BLOG_OUTLINE),
        "medium_blog_post/abstract" => Some(BLOG_ABSTRACT),
        "medium_blog_post/concrete_examples" => Some(BLOG_EXAMPLES),
        "medium_blog_post/blog" => Some(BLOG_ARTICLE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
