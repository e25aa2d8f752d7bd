//! Built-in templates

mod medium_blog_post;
mod prompt_file;

pub use medium_blog_post::{
    Abstract, Article, BlogOutline, BlogSection, Example, Examples, MediumBlogPost, TitleSuggestions,
};
pub use prompt_file::{PROMPT_FILE_KEY, PromptFile};
