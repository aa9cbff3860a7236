use std::fmt::Display;

/// Builds one tag and its content.
///
/// ```
/// use render::TagBuilder;
///
/// let html = TagBuilder::new("a")
///     .attribute("href", "https://example.com")
///     .class("external")
///     .text("a < b")
///     .build();
/// assert_eq!(html, r#"<a href="https://example.com" class="external">a &lt; b</a>"#);
/// ```
#[derive(Debug, Clone)]
pub struct TagBuilder {
    name: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    content: Vec<String>,
    pretty: bool,
    void: bool,
}

impl TagBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        TagBuilder {
            name: name.into(),
            attributes: Vec::new(),
            classes: Vec::new(),
            styles: Vec::new(),
            content: Vec::new(),
            pretty: false,
            void: false,
        }
    }

    /// Puts every child on its own line. Lines are not indented, so
    /// preformatted content keeps its whitespace.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn attribute(mut self, name: &str, value: impl Display) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds the attribute only when a value is present.
    pub fn optional_attribute<V: Display>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.attribute(name, value),
            None => self,
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Adds a CSS declaration to the `style` attribute, skipping absent values.
    pub fn style<V: Display>(mut self, property: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.styles.push((property.to_string(), value.to_string()));
        }
        self
    }

    /// Appends already-rendered markup.
    pub fn child(mut self, fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        if !fragment.is_empty() {
            self.content.push(fragment);
        }
        self
    }

    /// Appends text, escaping it.
    pub fn text(self, text: &str) -> Self {
        let escaped = html_escape::encode_text(text).into_owned();
        self.child(escaped)
    }

    /// Renders as a self-closing tag without content.
    pub fn void(mut self) -> Self {
        self.void = true;
        self
    }

    pub fn build(self) -> String {
        let mut out = format!("<{}", self.name);
        for (name, value) in &self.attributes {
            push_attribute(&mut out, name, value);
        }
        if !self.classes.is_empty() {
            push_attribute(&mut out, "class", &self.classes.join(" "));
        }
        if !self.styles.is_empty() {
            let style: Vec<String> = self.styles.iter().map(|(p, v)| format!("{}: {};", p, v)).collect();
            push_attribute(&mut out, "style", &style.join(" "));
        }

        if self.void {
            out.push_str(" />");
            return out;
        }
        out.push('>');

        if self.pretty && !self.content.is_empty() {
            out.push('\n');
            for fragment in &self.content {
                out.push_str(fragment);
                out.push('\n');
            }
        } else {
            for fragment in &self.content {
                out.push_str(fragment);
            }
        }

        out.push_str(&format!("</{}>", self.name));
        out
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(value));
    out.push('"');
}
