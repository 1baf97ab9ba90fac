use std::io::Read;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use thiserror::Error;

use crate::handler::{AttributeMap, ExtractHandler};
use crate::listener::Listener;

/// Failures the driver can surface to the caller.
///
/// Malformed JSON-LD blocks are never reported here: they are isolated and
/// skipped so the rest of the document keeps being extracted.
#[derive(Debug, Error)]
pub enum Error {
    /// The input document could not be read.
    #[error("failed to read input document")]
    Io(#[from] std::io::Error),
}

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements only have a start tag; end tags must not be specified for
/// void elements." The adapter synthesizes their close events so the handler
/// always sees a balanced stream.
fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "basefont"
            | "bgsound"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Adapts the raw html5ever token stream into the balanced tag-event
/// contract the handler expects.
///
/// Normalizations performed:
/// - void elements and self-closing start tags get an immediate synthetic
///   close event
/// - an end tag matching an outer open element first closes the unclosed
///   elements in between; an end tag matching nothing is dropped
/// - elements still open at end of input are closed, innermost first
/// - `script` (and the other raw-text elements) switch the tokenizer into
///   raw-text mode, so JSON-LD punctuation arrives as verbatim character data
struct TagEventAdapter<'d, 'l> {
    handler: ExtractHandler<'d, 'l>,
    /// Lowercased names of elements opened but not yet closed.
    open_elements: Vec<String>,
}

impl TagEventAdapter<'_, '_> {
    fn start_tag(&mut self, tag: &Tag) -> TokenSinkResult<()> {
        let name = (*tag.name).to_ascii_lowercase();
        let attrs: AttributeMap = tag
            .attrs
            .iter()
            .map(|attr| {
                let value: &str = &attr.value;
                ((*attr.name.local).to_ascii_lowercase(), value.to_owned())
            })
            .collect();

        self.handler.tag_open(&name, &attrs);

        if tag.self_closing || is_void_element(&name) {
            self.handler.tag_close(&name);
            return TokenSinkResult::Continue;
        }
        self.open_elements.push(name.clone());

        // [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
        // The tree-construction stage normally switches the tokenizer for
        // these elements; with no tree builder attached, the sink does it.
        match name.as_str() {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" | "xmp" | "noframes" => TokenSinkResult::RawData(RawKind::Rawtext),
            "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
            _ => TokenSinkResult::Continue,
        }
    }

    fn end_tag(&mut self, tag: &Tag) {
        let name = (*tag.name).to_ascii_lowercase();
        // Stray end tags are dropped; a match closes everything above it.
        if let Some(position) = self.open_elements.iter().rposition(|open| *open == name) {
            while self.open_elements.len() > position {
                if let Some(open) = self.open_elements.pop() {
                    self.handler.tag_close(&open);
                }
            }
        }
    }

    /// Close anything left open and deliver the end-of-document event.
    fn finish(&mut self) {
        while let Some(open) = self.open_elements.pop() {
            self.handler.tag_close(&open);
        }
        self.handler.document_end();
    }
}

impl TokenSink for TagEventAdapter<'_, '_> {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => self.start_tag(&tag),
                TagKind::EndTag => {
                    self.end_tag(&tag);
                    TokenSinkResult::Continue
                }
            },
            Token::CharacterTokens(text) => {
                self.handler.text(&text);
                TokenSinkResult::Continue
            }
            Token::NullCharacterToken
            | Token::DoctypeToken(_)
            | Token::CommentToken(_)
            | Token::ParseError(_)
            | Token::EOFToken => TokenSinkResult::Continue,
        }
    }
}

/// A parser scanning HTML documents for schema.org data.
///
/// Listeners registered with the parser are called back, in registration
/// order, for every event of every subsequent [`parse`](Parser::parse) call.
///
/// # Example
///
/// ```
/// use magpie_extract::{DefaultListener, Parser};
///
/// let mut listener = DefaultListener::new();
/// let mut parser = Parser::new();
/// parser.register_listener(&mut listener);
/// parser
///     .parse(r#"<div itemscope itemtype="http://schema.org/Person"></div>"#)
///     .expect("parse should succeed");
/// assert_eq!(listener.total_itemtypes(), 1);
/// ```
#[derive(Default)]
pub struct Parser<'l> {
    listeners: Vec<&'l mut dyn Listener>,
}

impl<'l> Parser<'l> {
    /// Create a parser with no listeners registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it is notified after all previously registered
    /// listeners.
    pub fn register_listener(&mut self, listener: &'l mut dyn Listener) {
        self.listeners.push(listener);
    }

    /// Parse the given document, issuing callbacks to every registered
    /// listener.
    ///
    /// The tokenizer is permissive: unclosed tags, stray end tags, and other
    /// malformed markup never fail the parse. Each call processes the
    /// document with fresh extraction state, so parsing the same document
    /// twice yields identical callbacks.
    ///
    /// # Errors
    ///
    /// Currently infallible for in-memory input; the `Result` reserves the
    /// driver's error surface (see [`Parser::parse_reader`]).
    pub fn parse(&mut self, html: &str) -> Result<(), Error> {
        let mut handler = ExtractHandler::new(&mut self.listeners);
        handler.document_start();

        let adapter = TagEventAdapter {
            handler,
            open_elements: Vec::new(),
        };
        let mut input = BufferQueue::new();
        if !html.is_empty() {
            input.push_back(StrTendril::from(html));
        }

        let mut tokenizer = Tokenizer::new(adapter, TokenizerOpts::default());
        let _ = tokenizer.feed(&mut input);
        tokenizer.end();
        tokenizer.sink.finish();
        Ok(())
    }

    /// Read a whole document from `reader`, then parse it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading fails; no callbacks are issued in
    /// that case.
    pub fn parse_reader<R: Read>(&mut self, mut reader: R) -> Result<(), Error> {
        let mut html = String::new();
        let _ = reader.read_to_string(&mut html)?;
        self.parse(&html)
    }
}
