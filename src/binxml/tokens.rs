/// One raw BinXML token byte. Bit `0x40` marks the "has attributes" or
/// "attribute value" flavor of a token and is folded into the variant.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinXmlRawToken {
    EndOfStream,
    OpenStartElement { has_attributes: bool },
    CloseStartElement,
    CloseEmptyElement,
    CloseElement,
    Value,
    Attribute,
    TemplateInstance,
    NormalSubstitution,
    ConditionalSubstitution,
    StartOfStream,
}

impl BinXmlRawToken {
    pub fn from_u8(byte: u8) -> Option<BinXmlRawToken> {
        match byte {
            0x00 => Some(BinXmlRawToken::EndOfStream),
            // <Event>
            0x01 => Some(BinXmlRawToken::OpenStartElement {
                has_attributes: false,
            }),
            0x41 => Some(BinXmlRawToken::OpenStartElement {
                has_attributes: true,
            }),
            // Indicates end of start element
            0x02 => Some(BinXmlRawToken::CloseStartElement),
            0x03 => Some(BinXmlRawToken::CloseEmptyElement),
            // </Event>
            0x04 => Some(BinXmlRawToken::CloseElement),
            0x05 | 0x45 => Some(BinXmlRawToken::Value),
            0x06 | 0x46 => Some(BinXmlRawToken::Attribute),
            0x0c => Some(BinXmlRawToken::TemplateInstance),
            0x0d => Some(BinXmlRawToken::NormalSubstitution),
            0x0e => Some(BinXmlRawToken::ConditionalSubstitution),
            0x0f => Some(BinXmlRawToken::StartOfStream),
            _ => None,
        }
    }
}
