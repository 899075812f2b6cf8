//! Rich text vocabulary for post bodies

/// Inline text styles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub strong: bool,
    pub emphasis: bool,
    pub strike: bool,
    pub superscript: bool,
}

/// Inline content
#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Text { text: String, style: Style },
    Link { url: String, children: Vec<Span> },
    Code { text: String },
    Br,
    /// Content the producer could not represent
    Error { text: String, value: String },
}

/// Block content
#[derive(Debug, Clone, PartialEq)]
pub enum Paragraph {
    Paragraph(Vec<Span>),
    Heading { level: u8, children: Vec<Span> },
    Blockquote(Vec<Paragraph>),
    List { ordered: bool, items: Vec<Vec<Paragraph>> },
    CodeBlock { text: String, lang: Option<String> },
    HorizontalLine,
}

/// A rich text document
pub type RichText = Vec<Paragraph>;

/// Plain text split into paragraphs on blank lines
pub fn plain(text: &str) -> RichText {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            Paragraph::Paragraph(vec![Span::Text {
                text: p.to_string(),
                style: Style::default(),
            }])
        })
        .collect()
}

/// Concatenate the visible text of a document, one line per paragraph
pub fn to_plain_text(text: &RichText) -> String {
    let mut out = Vec::new();
    for paragraph in text {
        paragraph_text(paragraph, &mut out);
    }
    out.join("\n")
}

fn paragraph_text(paragraph: &Paragraph, out: &mut Vec<String>) {
    match paragraph {
        Paragraph::Paragraph(spans) | Paragraph::Heading { children: spans, .. } => {
            out.push(spans_text(spans))
        }
        Paragraph::Blockquote(children) => {
            for child in children {
                paragraph_text(child, out);
            }
        }
        Paragraph::List { items, .. } => {
            for item in items {
                for child in item {
                    paragraph_text(child, out);
                }
            }
        }
        Paragraph::CodeBlock { text, .. } => out.push(text.clone()),
        Paragraph::HorizontalLine => out.push("---".to_string()),
    }
}

fn spans_text(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Span::Text { text, .. } | Span::Code { text } | Span::Error { text, .. } => text.clone(),
            Span::Link { children, .. } => spans_text(children),
            Span::Br => "\n".to_string(),
        })
        .collect()
}
