use crate::binxml::name::read_name;
use crate::binxml::tokens::BinXmlRawToken;
use crate::binxml::value::{decode_sized_value_type, BinXmlValueType};
use crate::err::{EvtxError, Result};
use crate::template_cache::{Template, TemplateCache};
use crate::utils::{read_exact_bytes, read_len_prefixed_utf16_string};

use byteorder::ReadBytesExt;
use log::{trace, warn};
use std::collections::HashMap;
use std::io::{Cursor, Seek, SeekFrom};

/// Stateful interpreter for record BinXML.
///
/// One instance serves a whole file: the template cache and element path
/// live for a chunk, everything else for a single record.
pub(crate) struct BinXmlInterpreter {
    templates: TemplateCache,
    /// Names of the currently open elements, innermost last.
    xpath: Vec<String>,
    /// Name of the attribute currently being populated, empty between attributes.
    attr: String,
    /// Most recent `Name` attribute value seen on an `EventData/Data` element.
    evtname: String,
    /// The template currently being compiled. `None` whenever values must
    /// not be captured into a template (argument decoding, nested fragments).
    current_template: Option<Template>,
    /// Flattened key/value output for the record being parsed.
    variables: HashMap<String, String>,
}

impl BinXmlInterpreter {
    pub fn new() -> Self {
        BinXmlInterpreter {
            templates: TemplateCache::new(),
            xpath: Vec::with_capacity(16),
            attr: String::new(),
            evtname: String::new(),
            current_template: None,
            variables: HashMap::new(),
        }
    }

    /// Chunk boundary: template ids and name offsets from the previous chunk
    /// are meaningless now.
    pub fn reset(&mut self) {
        trace!("Dropping {} cached templates", self.templates.len());
        self.templates.clear();
        self.xpath.clear();
    }

    pub fn reset_per_record(&mut self) {
        self.variables.clear();
        self.current_template = None;
        self.attr.clear();
        self.evtname.clear();
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    #[cfg(test)]
    pub fn template_cache_len(&self) -> usize {
        self.templates.len()
    }

    #[cfg(test)]
    pub fn open_element_depth(&self) -> usize {
        self.xpath.len()
    }

    /// The token pull loop: reads one token byte at a time until an
    /// end-of-fragment token or the end of the data.
    pub fn parse_fragment(&mut self, cursor: &mut Cursor<&[u8]>) -> Result<()> {
        loop {
            let offset = cursor.position();
            let byte = match cursor.read_u8() {
                Ok(byte) => byte,
                Err(_) => break,
            };

            let token = BinXmlRawToken::from_u8(byte)
                .ok_or(EvtxError::InvalidToken { value: byte, offset })?;
            trace!("Offset `0x{:08x}` - {:?}", offset, token);

            match token {
                BinXmlRawToken::EndOfStream => break,
                BinXmlRawToken::OpenStartElement { has_attributes } => {
                    self.read_open_start_element(cursor, has_attributes)?
                }
                BinXmlRawToken::CloseStartElement => self.attr.clear(),
                BinXmlRawToken::CloseEmptyElement | BinXmlRawToken::CloseElement => {
                    self.xpath.pop();
                    self.attr.clear();
                }
                BinXmlRawToken::Value => self.read_value_text(cursor)?,
                BinXmlRawToken::Attribute => self.attr = read_name(cursor)?,
                BinXmlRawToken::TemplateInstance => self.read_template_instance(cursor)?,
                BinXmlRawToken::NormalSubstitution
                | BinXmlRawToken::ConditionalSubstitution => self.read_substitution(cursor)?,
                BinXmlRawToken::StartOfStream => {
                    // Fragment header: major/minor version and flags.
                    cursor.seek(SeekFrom::Current(3))?;
                }
            }
        }

        Ok(())
    }

    fn read_open_start_element(
        &mut self,
        cursor: &mut Cursor<&[u8]>,
        has_attributes: bool,
    ) -> Result<()> {
        let _dependency_identifier =
            try_read!(cursor, u16, "open_start_element_dependency_identifier")?;
        let _data_size = try_read!(cursor, u32, "open_start_element_data_size")?;

        let name = read_name(cursor)?;
        trace!("\t element name - `{}`", name);

        if has_attributes {
            let _attribute_list_data_size =
                try_read!(cursor, u32, "open_start_element_attribute_list_data_size")?;
        }

        self.xpath.push(name);
        self.attr.clear();
        Ok(())
    }

    /// Decides which key a value or substitution binds to: the current
    /// attribute wins; text children of `EventData/Data` inherit the most
    /// recent `Name` attribute; otherwise the innermost element names the
    /// value.
    fn resolve_key(&self) -> String {
        if !self.attr.is_empty() {
            return self.attr.clone();
        }

        if self.in_event_data_data() && !self.evtname.is_empty() {
            return self.evtname.clone();
        }

        match self.xpath.last() {
            Some(element) => element.clone(),
            None => String::new(),
        }
    }

    fn in_event_data_data(&self) -> bool {
        match self.xpath.as_slice() {
            [.., parent, leaf] => parent == "EventData" && leaf == "Data",
            _ => false,
        }
    }

    fn read_value_text(&mut self, cursor: &mut Cursor<&[u8]>) -> Result<()> {
        let _value_kind = try_read!(cursor, u8, "value_text_kind")?;
        let text = read_len_prefixed_utf16_string(cursor, false)?;
        trace!("\t value text - `{}`", text);

        // `<Data Name="...">` inside `EventData` names the text children
        // that follow rather than contributing a value of its own.
        if self.attr == "Name" && self.in_event_data_data() {
            self.evtname = text;
            return Ok(());
        }

        let key = self.resolve_key();
        if key.is_empty() {
            return Ok(());
        }

        let quoted = format!("'{}'", text);
        match self.current_template.as_mut() {
            Some(template) => {
                template.fixed.insert(key, quoted);
            }
            None => {
                self.variables.insert(key, quoted);
            }
        }
        Ok(())
    }

    fn read_substitution(&mut self, cursor: &mut Cursor<&[u8]>) -> Result<()> {
        let index = try_read!(cursor, u16, "substitution_index")?;
        let value_type = try_read!(cursor, u8, "substitution_value_type")?;
        if value_type == 0 {
            let _ = try_read!(cursor, u8, "substitution_value_type_padding")?;
        }

        let key = self.resolve_key();
        if let Some(template) = self.current_template.as_mut() {
            trace!("\t placeholder {} -> `{}`", index, key);
            template.subst.insert(index, key);
        }
        Ok(())
    }

    fn read_template_instance(&mut self, cursor: &mut Cursor<&[u8]>) -> Result<()> {
        let offset = cursor.position();
        let lead = try_read!(cursor, u8, "template_instance_lead")?;
        if lead != 0x01 {
            return Err(EvtxError::InvalidTemplateInstanceMagic { value: lead, offset });
        }

        let template_id = try_read!(cursor, u32, "template_id")?;
        let _template_definition_offset = try_read!(cursor, u32, "template_definition_offset")?;
        let mut number_of_substitutions = try_read!(cursor, u32, "number_of_substitutions")?;

        if !self.templates.contains(template_id) {
            // An unseen id is immediately followed by its definition.
            let _identifier = read_exact_bytes(cursor, 16, "template_identifier")?;
            let body_size = try_read!(cursor, u32, "template_body_size")?;
            let body_start = cursor.position();

            trace!(
                "Compiling template `0x{:08x}` at 0x{:08x}, body size {}",
                template_id,
                body_start,
                body_size
            );

            self.current_template = Some(Template::default());
            let parsed = self.parse_fragment(cursor);
            let template = self.current_template.take().unwrap_or_default();
            parsed?;
            self.templates.insert(template_id, template);

            // The body advertises its exact extent; trust it over whatever
            // the inner parse consumed.
            cursor.seek(SeekFrom::Start(body_start + u64::from(body_size)))?;
            number_of_substitutions = try_read!(cursor, u32, "number_of_substitutions")?;
        }

        if let Some(template) = self.templates.get(template_id) {
            for (key, value) in &template.fixed {
                self.variables.insert(key.clone(), value.clone());
            }
        }

        let count = number_of_substitutions as usize;
        let mut descriptors = Vec::with_capacity(count);
        for _ in 0..count {
            let size = try_read!(cursor, u16, "substitution_value_size")?;
            let value_type = try_read!(cursor, u16, "substitution_value_type")?;
            descriptors.push((size, value_type));
        }

        for (i, (size, raw_type)) in descriptors.into_iter().enumerate() {
            let index = i as u16;
            if size == 0 {
                continue;
            }

            let value_start = cursor.position();
            let value_type = BinXmlValueType::from_u16(raw_type).ok_or(
                EvtxError::InvalidValueType {
                    value: raw_type,
                    offset: value_start,
                },
            )?;

            let value = match value_type {
                BinXmlValueType::BinXmlType => {
                    // A nested fragment instantiates its own template and
                    // writes its own entries; suppress the outer template
                    // sink for its duration.
                    let saved = self.current_template.take();
                    let parsed = self.parse_fragment(cursor);
                    self.current_template = saved;
                    parsed?;

                    cursor.seek(SeekFrom::Start(value_start + u64::from(size)))?;
                    None
                }
                _ => {
                    let decoded = decode_sized_value_type(&value_type, cursor, size)?;

                    let expected_position = value_start + u64::from(size);
                    if cursor.position() != expected_position {
                        // Dirty samples sometimes declare more bytes than
                        // the value encodes.
                        warn!(
                            "Value {:?} consumed up to {}, expected {}; resynchronizing",
                            value_type,
                            cursor.position(),
                            expected_position
                        );
                        cursor.seek(SeekFrom::Start(expected_position))?;
                    }

                    Some(decoded)
                }
            };

            if let Some(value) = value {
                let key = match self
                    .templates
                    .get(template_id)
                    .and_then(|template| template.subst.get(&index))
                {
                    Some(key) => key.clone(),
                    // Unmapped null fillers would only pollute the map.
                    None if raw_type == 0x00 => continue,
                    None => format!("arg_{}", index),
                };

                self.variables.insert(key, value);
            }
        }

        Ok(())
    }
}
