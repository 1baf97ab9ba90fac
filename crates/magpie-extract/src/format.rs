use strum_macros::Display;

/// Authoring conventions that can carry schema.org annotations.
///
/// Every discovered item and item type is tagged with the convention that
/// produced it, so observers can tell the two supported formats apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Format {
    /// Annotations encoded as JSON inside `<script type="application/ld+json">`,
    /// per [JSON-LD 1.1](https://www.w3.org/TR/json-ld11/).
    JsonLd,

    /// Annotations spread across `itemscope`/`itemtype`/`itemprop` tag
    /// attributes, per [W3C Microdata](https://www.w3.org/TR/microdata/).
    Microdata,

    /// RDFa attribute annotations. Declared for parity with the recognized
    /// format set; no extraction rules are implemented.
    Rdfa,

    /// No schema.org annotation.
    None,
}
