//! Intermediate representation of generated code
//!
//! Emitters build a small tree of lines and nested blocks instead of
//! formatting text directly. Member references are kept apart from literal
//! text so that the renderer decides how an instance member is spelled.

/// Part of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Literal text
    Text(String),
    /// Reference to a member of the current instance
    Field(String),
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Fragment::Text(text.to_string())
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Fragment::Text(text)
    }
}

/// Reference to the instance member `name`
pub fn field(name: &str) -> Fragment {
    Fragment::Field(name.to_string())
}

/// One line of code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line(pub Vec<Fragment>);

impl Line {
    /// A line of literal text
    pub fn text(text: impl Into<String>) -> Self {
        Line(vec![Fragment::Text(text.into())])
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Line::text(text)
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Line::text(text)
    }
}

impl From<Vec<Fragment>> for Line {
    fn from(parts: Vec<Fragment>) -> Self {
        Line(parts)
    }
}

/// A header line with an indented body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Opening line (`def f(self)`, `if x`, `class C(B)`)
    pub header: Line,
    /// Indented statements
    pub body: Vec<Item>,
}

/// An element of a code listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A statement
    Line(Line),
    /// A nested block
    Block(Block),
    /// An empty line
    Blank,
    /// Pre-formatted text, inserted line by line at the current indentation
    Verbatim(String),
}

/// A statement of literal text
pub fn text(text: impl Into<String>) -> Item {
    Item::Line(Line::text(text))
}

/// A statement built from fragments
pub fn line(parts: Vec<Fragment>) -> Item {
    Item::Line(Line(parts))
}

/// A block with the given header and body
pub fn block(header: impl Into<Line>, body: Vec<Item>) -> Item {
    Item::Block(Block {
        header: header.into(),
        body,
    })
}

/// Collects items in order
#[derive(Debug, Default)]
pub struct Listing {
    items: Vec<Item>,
}

impl Listing {
    /// Create an empty listing
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    pub fn push(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    /// Append a statement of literal text
    pub fn text(&mut self, line: impl Into<String>) -> &mut Self {
        self.push(text(line))
    }

    /// Append several items
    pub fn extend(&mut self, items: impl IntoIterator<Item = Item>) -> &mut Self {
        self.items.extend(items);
        self
    }

    /// Whether nothing was added
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The collected items
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_preserves_order() {
        let mut listing = Listing::new();
        listing.text("a = 1").push(Item::Blank).text("b = 2");
        let items = listing.into_items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], Item::Blank);
    }

    #[test]
    fn test_line_from_fragments() {
        let item = line(vec!["return ".into(), field("value")]);
        match item {
            Item::Line(Line(parts)) => {
                assert_eq!(parts[1], Fragment::Field("value".to_string()));
            }
            _ => panic!("expected a line"),
        }
    }
}
