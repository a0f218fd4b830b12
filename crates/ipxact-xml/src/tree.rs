//! Generic XML document codec.
//!
//! Converts between text and an [`XmlDocument`]: the comments and processing
//! instructions ahead of the root, plus the root [`XmlElement`] tree.
//! Whitespace-only text is dropped; everything else is kept.

use std::io::Write;

use ipxact_core::{XmlElement, XmlNode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, XmlError};

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlDocument {
    /// Comments and processing instructions before the root element.
    pub prolog: Vec<XmlNode>,
    /// The root element.
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        XmlDocument {
            prolog: Vec::new(),
            root,
        }
    }

    /// Parse a document from text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut prolog = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|e| malformed(position, e))?;
            let node = match event {
                Event::Start(start) => {
                    stack.push(start_element(&start, position)?);
                    continue;
                }
                Event::Empty(start) => XmlNode::Element(start_element(&start, position)?),
                Event::End(_) => match stack.pop() {
                    Some(element) => XmlNode::Element(element),
                    None => return Err(malformed(position, "unbalanced end tag")),
                },
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| malformed(position, e))?;
                    if text.trim().is_empty() {
                        continue;
                    }
                    XmlNode::Text(text.into_owned())
                }
                Event::CData(data) => XmlNode::Text(utf8(&data, position)?),
                Event::Comment(comment) => XmlNode::Comment(utf8(&comment, position)?),
                Event::PI(pi) => {
                    let content = utf8(&pi, position)?;
                    let (target, data) = content
                        .split_once(char::is_whitespace)
                        .map(|(t, d)| (t.to_string(), d.trim_start().to_string()))
                        .unwrap_or((content.clone(), String::new()));
                    XmlNode::ProcessingInstruction { target, data }
                }
                Event::Decl(_) | Event::DocType(_) => continue,
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => match node {
                    XmlNode::Element(element) if root.is_none() => root = Some(element),
                    XmlNode::Element(_) => {
                        return Err(malformed(position, "more than one root element"));
                    }
                    XmlNode::Text(_) => {
                        return Err(malformed(position, "text outside the root element"));
                    }
                    other if root.is_none() => prolog.push(other),
                    // Trailing comments after the root are not kept.
                    _ => {}
                },
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::UnexpectedEof);
        }
        let root = root.ok_or(XmlError::NoRootElement)?;
        Ok(XmlDocument { prolog, root })
    }

    /// Write the document with an XML declaration to `out`. An `indent` of
    /// zero writes everything on one line.
    pub fn write_to<W: Write>(&self, out: W, indent: usize) -> Result<()> {
        let mut writer = if indent == 0 {
            Writer::new(out)
        } else {
            Writer::new_with_indent(out, b' ', indent)
        };
        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        writer
            .into_inner()
            .write_all(b"\n")
            .map_err(|e| XmlError::Write(e.to_string()))
    }

    /// Write the document to a string.
    pub fn to_xml_string(&self, indent: usize) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer, indent)?;
        String::from_utf8(buffer).map_err(|e| XmlError::Write(e.to_string()))
    }
}

fn malformed(position: u64, detail: impl ToString) -> XmlError {
    XmlError::Malformed {
        position,
        detail: detail.to_string(),
    }
}

fn utf8(bytes: &[u8], position: u64) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| malformed(position, e))
}

fn start_element(start: &BytesStart<'_>, position: u64) -> Result<XmlElement> {
    let name = utf8(start.name().as_ref(), position)?;
    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| malformed(position, e))?;
        let key = utf8(attribute.key.as_ref(), position)?;
        let value = attribute
            .unescape_value()
            .map_err(|e| malformed(position, e))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element(element) => write_element(writer, element),
        XmlNode::Text(text) => emit(writer, Event::Text(BytesText::new(text))),
        XmlNode::Comment(text) => emit(writer, Event::Comment(BytesText::from_escaped(text.as_str()))),
        XmlNode::ProcessingInstruction { target, data } => {
            let content = if data.is_empty() {
                target.clone()
            } else {
                format!("{target} {data}")
            };
            emit(writer, Event::PI(BytesPI::new(content)))
        }
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_prolog_attributes_and_text() {
        let text = r#"<?xml version="1.0"?>
<!--Commented section-->
<?xml-stylesheet href="style.css"?>
<root a="1 &amp; 2">
    <child>value &lt; 3</child>
    <empty/>
</root>"#;
        let document = XmlDocument::parse(text).unwrap();

        assert_eq!(document.prolog.len(), 2);
        assert_eq!(document.prolog[0], XmlNode::Comment("Commented section".into()));
        assert_eq!(
            document.prolog[1],
            XmlNode::ProcessingInstruction {
                target: "xml-stylesheet".into(),
                data: r#"href="style.css""#.into(),
            }
        );
        assert_eq!(document.root.attribute("a"), Some("1 & 2"));
        assert_eq!(document.root.child_text("child").as_deref(), Some("value < 3"));
        assert!(document.root.child("empty").unwrap().is_empty());
        assert_eq!(document.root.children.len(), 2);
    }

    #[test]
    fn write_then_parse_gives_equivalent_tree() {
        let mut root = XmlElement::new("ipxact:root").attr("x", "\"quoted\"");
        root.push(XmlElement::with_text("ipxact:a", "1 < 2"));
        root.push(XmlElement::new("ipxact:b"));
        let mut document = XmlDocument::new(root);
        document.prolog.push(XmlNode::Comment("top".into()));

        for indent in [0, 4] {
            let text = document.to_xml_string(indent).unwrap();
            assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
            let parsed = XmlDocument::parse(&text).unwrap();
            assert!(parsed.root.equivalent(&document.root));
            assert_eq!(parsed.prolog, document.prolog);
        }
    }

    #[test]
    fn malformed_input_is_reported() {
        assert!(matches!(
            XmlDocument::parse("<a><b></a>"),
            Err(XmlError::Malformed { .. })
        ));
        assert!(XmlDocument::parse("<a>").is_err());
        assert_eq!(XmlDocument::parse("<!-- only -->"), Err(XmlError::NoRootElement));
    }
}
