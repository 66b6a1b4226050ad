//! Text extraction collaborators for the supported document formats.
//!
//! Every extractor takes the raw file bytes and returns plain text, or an
//! [`ExtractError`] that fails only that file's processing. DOCX and PPTX are
//! ZIP archives holding XML parts; PDF goes through `pdf-extract`.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::{BytesRef, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::ExtractError;
use crate::process::DocFormat;

/// Dispatches to the extractor for `format`.
pub fn extract_text(bytes: &[u8], format: DocFormat) -> Result<String, ExtractError> {
    match format {
        DocFormat::Pdf => extract_text_from_pdf(bytes),
        DocFormat::Docx => extract_text_from_docx(bytes),
        DocFormat::Pptx => extract_text_from_pptx(bytes),
    }
}

pub fn extract_text_from_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

pub fn extract_text_from_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;
    let xml = read_entry(&mut zip, "word/document.xml", "word/document.xml")?;
    parse_docx_xml(&xml)
}

pub fn extract_text_from_pptx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;

    let mut slides: Vec<String> = zip
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(str::to_owned)
        .collect();
    if slides.is_empty() {
        return Err(ExtractError::MissingEntry("ppt/slides/slide*.xml"));
    }
    // Slide order is the numeric suffix, not the archive entry order.
    slides.sort_by_key(|name| slide_number(name));

    let mut out = String::new();
    for name in &slides {
        let xml = read_entry(&mut zip, name, "ppt/slides/slide*.xml")?;
        out.push_str(&parse_slide_xml(&xml)?);
        out.push('\n');
    }
    Ok(normalize_whitespace(&out))
}

// ---- Internal helpers ----

fn read_entry(
    zip: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    label: &'static str,
) -> Result<String, ExtractError> {
    let mut entry = zip.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => ExtractError::MissingEntry(label),
        other => ExtractError::Zip(other),
    })?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

fn slide_number(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(u32::MAX)
}

/// Collects the `<w:t>` text runs of a document body. Runs concatenate
/// directly (WordprocessingML keeps significant whitespace inside `w:t`);
/// `<w:br>` and paragraph ends become newlines.
fn parse_docx_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text_run = true,
                b"br" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"br" {
                    out.push('\n');
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                out.push_str(&t.decode().map_err(|e| ExtractError::Xml(e.to_string()))?);
            }
            Ok(Event::GeneralRef(e)) if in_text_run => {
                push_general_ref(&mut out, &e)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Xml(e.to_string())),
            _ => {}
        }
    }
    Ok(normalize_whitespace(&out))
}

/// Collects the `<a:t>` text runs of one slide, space-separated.
fn parse_slide_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if local_name(e.name().as_ref()) == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::End(e)) => {
                if local_name(e.name().as_ref()) == b"t" {
                    in_text_run = false;
                    out.push(' ');
                }
            }
            Ok(Event::Text(t)) if in_text_run => {
                out.push_str(&t.decode().map_err(|e| ExtractError::Xml(e.to_string()))?);
            }
            Ok(Event::GeneralRef(e)) if in_text_run => {
                push_general_ref(&mut out, &e)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Xml(e.to_string())),
            _ => {}
        }
    }
    Ok(out)
}

/// Appends the character a general entity reference stands for. Predefined
/// XML entities and numeric character references resolve exactly; anything
/// unresolvable degrades to a space so adjacent words never merge.
fn push_general_ref(out: &mut String, reference: &BytesRef<'_>) -> Result<(), ExtractError> {
    let name = reference
        .decode()
        .map_err(|e| ExtractError::Xml(e.to_string()))?;
    match resolve_entity(&name) {
        Some(c) => out.push(c),
        None => out.push(' '),
    }
    Ok(())
}

/// Resolves a reference name (without `&`/`;`): the five predefined XML
/// entities plus decimal and hex character references.
fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

fn normalize_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_blank = false;
    for raw_line in s.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            if !last_blank {
                out.push('\n');
                last_blank = true;
            }
        } else {
            out.push_str(line);
            out.push('\n');
            last_blank = false;
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docx_paragraphs_and_breaks_become_newlines() {
        let text = parse_docx_xml(
            r#"<w:document xmlns:w="ns"><w:body>
                <w:p><w:r><w:t>Line 1</w:t></w:r><w:r><w:br/></w:r><w:r><w:t>Line 2</w:t></w:r></w:p>
                <w:p><w:r><w:t>Para 2</w:t></w:r></w:p>
            </w:body></w:document>"#,
        )
        .unwrap();
        assert_eq!(text, "Line 1\nLine 2\nPara 2");
    }

    #[test]
    fn slide_text_runs_are_collected() {
        let text = parse_slide_xml(
            r#"<p:sld xmlns:a="ns" xmlns:p="ns2">
                <p:txBody><a:p><a:r><a:t>Title</a:t></a:r><a:r><a:t>slide</a:t></a:r></a:p></p:txBody>
                <p:extLst><p:ext uri="ignored">metadata text</p:ext></p:extLst>
            </p:sld>"#,
        )
        .unwrap();
        assert_eq!(text.trim(), "Title slide");
    }

    #[test]
    fn slide_numbers_sort_numerically() {
        let mut names = vec![
            "ppt/slides/slide10.xml".to_string(),
            "ppt/slides/slide2.xml".to_string(),
            "ppt/slides/slide1.xml".to_string(),
        ];
        names.sort_by_key(|n| slide_number(n));
        assert_eq!(
            names,
            ["ppt/slides/slide1.xml", "ppt/slides/slide2.xml", "ppt/slides/slide10.xml"]
        );
    }

    #[test]
    fn entity_references_resolve_inside_text_runs() {
        let text = parse_docx_xml(
            r#"<w:document xmlns:w="ns"><w:body>
                <w:p><w:r><w:t>Tom &amp; Jerry &#233;tude &#x41;</w:t></w:r></w:p>
            </w:body></w:document>"#,
        )
        .unwrap();
        assert_eq!(text, "Tom & Jerry étude A");
    }

    #[test]
    fn unknown_entity_reference_becomes_a_space() {
        let text = parse_docx_xml(
            r#"<w:document xmlns:w="ns"><w:body>
                <w:p><w:r><w:t>left&nbsp;right</w:t></w:r></w:p>
            </w:body></w:document>"#,
        )
        .unwrap();
        assert_eq!(text, "left right");
    }

    #[test]
    fn slide_runs_resolve_entities_too() {
        let text = parse_slide_xml(
            r#"<p:sld xmlns:a="ns" xmlns:p="ns2">
                <p:txBody><a:p><a:r><a:t>A &amp; B</a:t></a:r></a:p></p:txBody>
            </p:sld>"#,
        )
        .unwrap();
        assert_eq!(text.trim(), "A & B");
    }

    #[test]
    fn resolve_entity_covers_predefined_and_numeric_forms() {
        assert_eq!(resolve_entity("amp"), Some('&'));
        assert_eq!(resolve_entity("lt"), Some('<'));
        assert_eq!(resolve_entity("quot"), Some('"'));
        assert_eq!(resolve_entity("#65"), Some('A'));
        assert_eq!(resolve_entity("#x1F600"), Some('😀'));
        assert_eq!(resolve_entity("nbsp"), None);
        assert_eq!(resolve_entity("#xZZ"), None);
    }

    #[test]
    fn invalid_zip_is_rejected() {
        let err = extract_text_from_docx(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, ExtractError::Zip(_)));
    }
}
