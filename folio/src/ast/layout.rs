use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
}

impl Alignment {
    pub const NAMES: &'static [&'static str] = &["start", "center", "end", "spacebetween", "spacearound"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Alignment::Start),
            "center" => Some(Alignment::Center),
            "end" => Some(Alignment::End),
            "spacebetween" => Some(Alignment::SpaceBetween),
            "spacearound" => Some(Alignment::SpaceAround),
            _ => None,
        }
    }

    /// The CSS keyword used by the HTML renderer.
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Start => "start",
            Alignment::Center => "center",
            Alignment::End => "end",
            Alignment::SpaceBetween => "space-between",
            Alignment::SpaceAround => "space-around",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_css())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

impl Orientation {
    pub const NAMES: &'static [&'static str] = &["horizontal", "vertical"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "horizontal" | "row" => Some(Orientation::Horizontal),
            "vertical" | "column" => Some(Orientation::Vertical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    Circle,
}

impl Clip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Clip::Circle => "circle",
        }
    }
}

/// Decoration of a [`Node::Box`](crate::ast::Node::Box).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxStyle {
    pub title: Option<String>,
    pub padding: Option<String>,
    pub background: Option<String>,
    pub foreground: Option<String>,
}
