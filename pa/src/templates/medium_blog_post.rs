//! Medium blog post writer
//!
//! Six steps, each feeding the next: suggest titles, pick one, outline the
//! post, write an abstract, gather concrete examples, and write the article.
//! The article is returned as markdown.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::parser::{FieldKind, Schema, StructuredResponse};
use crate::template::{Template, TemplateDefinition, TemplateEngine};

/// Candidate titles for the post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSuggestions {
    pub titles: Vec<String>,
}

impl StructuredResponse for TitleSuggestions {
    fn schema() -> Schema {
        Schema::new("TitleSuggestions").required(
            "titles",
            FieldKind::list(FieldKind::String),
            "Candidate titles for the blog post",
        )
    }
}

/// One titled section of an outline or article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogSection {
    pub title: String,
    pub content: String,
}

impl BlogSection {
    fn schema(content: &str) -> Schema {
        Schema::new("BlogSection")
            .required("title", FieldKind::String, "Title of the section")
            .required("content", FieldKind::String, content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogOutline {
    pub sections: Vec<BlogSection>,
}

impl StructuredResponse for BlogOutline {
    fn schema() -> Schema {
        Schema::new("BlogOutline").required(
            "sections",
            FieldKind::list(FieldKind::Object(BlogSection::schema(
                "A few sentences describing what the section covers",
            ))),
            "Sections of the blog post, in order",
        )
    }
}

/// Titled entries as `## title` headings, blank line between entries
fn write_titled<'a>(
    f: &mut fmt::Formatter<'_>,
    entries: impl Iterator<Item = (&'a str, &'a str)>,
) -> fmt::Result {
    for (i, (title, content)) in entries.enumerate() {
        if i > 0 {
            write!(f, "\n\n")?;
        }
        write!(f, "## {}\n{}", title, content)?;
    }
    Ok(())
}

impl fmt::Display for BlogOutline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_titled(f, self.sections.iter().map(|s| (s.title.as_str(), s.content.as_str())))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Abstract {
    pub content: String,
}

impl StructuredResponse for Abstract {
    fn schema() -> Schema {
        Schema::new("Abstract").required("content", FieldKind::String, "Two or three sentence abstract")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Examples {
    pub examples: Vec<Example>,
}

impl StructuredResponse for Examples {
    fn schema() -> Schema {
        let example = Schema::new("Example")
            .required("title", FieldKind::String, "Short title of the example")
            .required("content", FieldKind::String, "The example itself");
        Schema::new("Examples").required(
            "examples",
            FieldKind::list(FieldKind::Object(example)),
            "Concrete examples illustrating the post",
        )
    }
}

impl fmt::Display for Examples {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_titled(f, self.examples.iter().map(|e| (e.title.as_str(), e.content.as_str())))
    }
}

/// The finished post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub sections: Vec<BlogSection>,
}

impl StructuredResponse for Article {
    fn schema() -> Schema {
        Schema::new("Article")
            .required("title", FieldKind::String, "Title of the blog post")
            .required("abstract", FieldKind::String, "Abstract shown under the title")
            .required(
                "sections",
                FieldKind::list(FieldKind::Object(BlogSection::schema("Markdown body of the section"))),
                "Sections of the blog post, in order",
            )
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "# {}\n\n> {}", self.title, self.summary)?;
        for section in &self.sections {
            write!(f, "\n\n## {}\n\n{}", section.title, section.content)?;
        }
        Ok(())
    }
}

/// Writes a Medium blog post about the `topic` variable
pub struct MediumBlogPost {
    engine: TemplateEngine,
}

impl MediumBlogPost {
    fn prompt(step: &str) -> String {
        format!("{}/{}", Self::NAME, step)
    }
}

impl TemplateDefinition for MediumBlogPost {
    const NAME: &'static str = "medium_blog_post";

    fn create(engine: TemplateEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Template for MediumBlogPost {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&mut self) -> Result<String> {
        info!("Suggesting titles");
        let suggestions: TitleSuggestions = self.engine.step_as(Self::prompt("title")).await?;
        self.engine.remember("title_suggestions", suggestions.titles);

        let title = self.engine.step(Self::prompt("select_title")).await?;
        let title = title.trim().to_string();
        info!("Selected title: {}", title);
        self.engine.remember("title", title);

        info!("Writing outline");
        let outline: BlogOutline = self.engine.step_as(Self::prompt("outline")).await?;
        self.engine.remember("outline", outline.to_string());

        info!("Writing abstract");
        let summary: Abstract = self.engine.step_as(Self::prompt("abstract")).await?;
        self.engine.remember("abstract", summary.content);

        info!("Gathering examples");
        let examples: Examples = self.engine.step_as(Self::prompt("concrete_examples")).await?;
        self.engine.remember("examples", examples.to_string());

        info!("Writing article");
        let article: Article = self.engine.step_as(Self::prompt("blog")).await?;
        Ok(article.to_string())
    }

    fn engine(&self) -> &TemplateEngine {
        &self.engine
    }
}
