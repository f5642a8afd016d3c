use deckgen_common::{Deck, DeckSlide, OutputFormat, SlideKind};
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

use super::{escape_xml, subtitle, DocumentWriter};
use crate::error::WriterError;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// An axis-aligned box in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

impl Rect {
    const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Largest box with the given aspect ratio centered inside `self`.
    fn fit(&self, width: u32, height: u32) -> Rect {
        if width == 0 || height == 0 {
            return *self;
        }
        let (w, h) = (i64::from(width), i64::from(height));
        if w * self.cy > h * self.cx {
            let cy = self.cx * h / w;
            Rect::new(self.x, self.y + (self.cy - cy) / 2, self.cx, cy)
        } else {
            let cx = self.cy * w / h;
            Rect::new(self.x + (self.cx - cx) / 2, self.y, cx, self.cy)
        }
    }
}

// 4:3 slide, 10in x 7.5in.
const SLIDE_CX: i64 = 9_144_000;
const SLIDE_CY: i64 = 6_858_000;

const TITLE_SLIDE_TITLE: Rect = Rect::new(685_800, 2_130_425, 7_772_400, 1_470_025);
const TITLE_SLIDE_SUBTITLE: Rect = Rect::new(1_371_600, 3_886_200, 6_400_800, 1_752_600);
const BODY_TITLE: Rect = Rect::new(457_200, 274_638, 8_229_600, 1_143_000);
const BODY_FULL: Rect = Rect::new(457_200, 1_600_200, 8_229_600, 4_525_963);
const BODY_LEFT: Rect = Rect::new(457_200, 1_600_200, 4_038_600, 4_525_963);
const IMAGE_REGION: Rect = Rect::new(4_648_200, 1_600_200, 4_038_600, 4_525_963);

/// Font sizes in hundredths of a point.
const TITLE_SIZE: u32 = 4400;
const SUBTITLE_SIZE: u32 = 2400;
const HEADING_SIZE: u32 = 3600;
const BULLET_SIZE: u32 = 1500;
const KEY_POINT_BULLET_SIZE: u32 = 1800;

/// Writes a minimal PresentationML package: one blank master and layout, one part per slide.
#[derive(Debug, Clone, Copy)]
pub struct PptxWriter {
    compression: zip::CompressionMethod,
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self {
            compression: zip::CompressionMethod::Deflated,
        }
    }
}

impl DocumentWriter for PptxWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pptx
    }

    fn render(&self, deck: &Deck) -> Result<Vec<u8>, WriterError> {
        let mut package = Package::new(self.compression);

        let mut media = Vec::new();
        for (i, slide) in deck.slides.iter().enumerate() {
            let index = i + 1;
            let image_part = match slide.image.format.extension() {
                Some(ext) if !slide.image.is_absent() => {
                    let name = format!("image{index}.{ext}");
                    package.add(&format!("ppt/media/{name}"), &slide.image.bytes)?;
                    media.push(ext);
                    Some(name)
                }
                _ => None,
            };

            let xml = slide_xml(deck, slide, image_part.is_some())?;
            package.add(&format!("ppt/slides/slide{index}.xml"), xml.as_bytes())?;
            let rels = slide_rels_xml(image_part.as_deref());
            package.add(&format!("ppt/slides/_rels/slide{index}.xml.rels"), rels.as_bytes())?;
        }

        let count = deck.slides.len();
        package.add("[Content_Types].xml", content_types_xml(count, &media).as_bytes())?;
        package.add("_rels/.rels", ROOT_RELS.as_bytes())?;
        package.add("ppt/presentation.xml", presentation_xml(count)?.as_bytes())?;
        package.add(
            "ppt/_rels/presentation.xml.rels",
            presentation_rels_xml(count)?.as_bytes(),
        )?;
        package.add("ppt/slideMasters/slideMaster1.xml", slide_master_xml().as_bytes())?;
        package.add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            MASTER_RELS.as_bytes(),
        )?;
        package.add("ppt/slideLayouts/slideLayout1.xml", slide_layout_xml().as_bytes())?;
        package.add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            LAYOUT_RELS.as_bytes(),
        )?;
        package.add("ppt/theme/theme1.xml", THEME_XML.as_bytes())?;

        package.finish()
    }
}

struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Package {
    fn new(compression: zip::CompressionMethod) -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(compression),
        }
    }

    fn add(&mut self, path: &str, content: &[u8]) -> Result<(), WriterError> {
        self.zip.start_file(path, self.options)?;
        self.zip.write_all(content)?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, WriterError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

fn slide_xml(deck: &Deck, slide: &DeckSlide, has_image: bool) -> Result<String, WriterError> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    write!(xml, r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#)?;
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

    let title = &slide.content.title;
    let bullets = &slide.content.bullets;
    match slide.kind {
        SlideKind::Title => {
            write_text_shape(&mut xml, 2, "Title", TITLE_SLIDE_TITLE, "ctr", |x| {
                write_paragraph(x, title, TITLE_SIZE, true, "ctr")
            })?;
            write_text_shape(&mut xml, 3, "Subtitle", TITLE_SLIDE_SUBTITLE, "t", |x| {
                write_paragraph(x, &subtitle(deck), SUBTITLE_SIZE, false, "ctr")
            })?;
        }
        SlideKind::Overview | SlideKind::Conclusion => {
            write_heading(&mut xml, title)?;
            write_bullets(&mut xml, BODY_FULL, bullets, BULLET_SIZE)?;
        }
        SlideKind::KeyPoint => {
            write_heading(&mut xml, title)?;
            write_bullets(&mut xml, BODY_LEFT, bullets, KEY_POINT_BULLET_SIZE)?;
            if has_image {
                let frame = match slide.image.dimensions {
                    Some((w, h)) => IMAGE_REGION.fit(w, h),
                    None => IMAGE_REGION,
                };
                write_picture(&mut xml, 4, frame)?;
            }
        }
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    Ok(xml)
}

fn write_heading(xml: &mut String, title: &str) -> Result<(), WriterError> {
    write_text_shape(xml, 2, "Title", BODY_TITLE, "ctr", |x| {
        write_paragraph(x, title, HEADING_SIZE, true, "l")
    })
}

fn write_bullets(
    xml: &mut String,
    rect: Rect,
    bullets: &[String],
    size: u32,
) -> Result<(), WriterError> {
    write_text_shape(xml, 3, "Content", rect, "t", |x| {
        if bullets.is_empty() {
            x.push_str("<a:p><a:endParaRPr lang=\"en-US\"/></a:p>");
            return Ok(());
        }
        for bullet in bullets {
            x.push_str(r#"<a:p><a:pPr marL="342900" indent="-342900"><a:spcAft><a:spcPts val="800"/></a:spcAft><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#);
            write!(
                x,
                r#"<a:r><a:rPr lang="en-US" sz="{size}" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                escape_xml(bullet)
            )?;
        }
        Ok(())
    })
}

fn write_paragraph(
    xml: &mut String,
    text: &str,
    size: u32,
    bold: bool,
    align: &str,
) -> Result<(), WriterError> {
    let b = if bold { "1" } else { "0" };
    write!(
        xml,
        r#"<a:p><a:pPr algn="{align}"/><a:r><a:rPr lang="en-US" sz="{size}" b="{b}" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
        escape_xml(text)
    )?;
    Ok(())
}

fn write_text_shape<F>(
    xml: &mut String,
    id: u32,
    name: &str,
    rect: Rect,
    anchor: &str,
    body: F,
) -> Result<(), WriterError>
where
    F: FnOnce(&mut String) -> Result<(), WriterError>,
{
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#
    )?;
    write!(
        xml,
        r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )?;
    write!(
        xml,
        r#"<p:txBody><a:bodyPr wrap="square" anchor="{anchor}"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#
    )?;
    body(xml)?;
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_picture(xml: &mut String, id: u32, rect: Rect) -> Result<(), WriterError> {
    write!(
        xml,
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#
    )?;
    xml.push_str(r#"<p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#);
    write!(
        xml,
        r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )?;
    Ok(())
}

fn slide_rels_xml(image_part: Option<&str>) -> String {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{NS_PKG_RELS}">"#);
    xml.push_str(&format!(
        r#"<Relationship Id="rId1" Type="{REL_BASE}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#
    ));
    if let Some(name) = image_part {
        xml.push_str(&format!(
            r#"<Relationship Id="rId2" Type="{REL_BASE}/image" Target="../media/{name}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn content_types_xml(slide_count: usize, media: &[&str]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for (ext, mime) in [("jpeg", "image/jpeg"), ("png", "image/png")] {
        if media.contains(&ext) {
            xml.push_str(&format!(r#"<Default Extension="{ext}" ContentType="{mime}"/>"#));
        }
    }
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for i in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// Relationship ids in presentation.xml.rels: rId1 master, rId2.. slides, then the theme.
fn presentation_xml(slide_count: usize) -> Result<String, WriterError> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    write!(xml, r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#)?;
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for i in 0..slide_count {
            write!(xml, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2)?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(xml, r#"<p:sldSz cx="{SLIDE_CX}" cy="{SLIDE_CY}" type="screen4x3"/>"#)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

fn presentation_rels_xml(slide_count: usize) -> Result<String, WriterError> {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{NS_PKG_RELS}">"#);
    write!(
        xml,
        r#"<Relationship Id="rId1" Type="{REL_BASE}/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#
    )?;
    for i in 1..=slide_count {
        write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{REL_BASE}/slide" Target="slides/slide{i}.xml"/>"#,
            i + 1
        )?;
    }
    write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{REL_BASE}/theme" Target="theme/theme1.xml"/>"#,
        slide_count + 2
    )?;
    xml.push_str("</Relationships>");
    Ok(xml)
}

const EMPTY_SP_TREE: &str = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree>"#;

fn slide_master_xml() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>{EMPTY_SP_TREE}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn slide_layout_xml() -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank">{EMPTY_SP_TREE}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#;

const MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#;

const LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

const THEME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_common::{ImageFormat, ResolvedImage, SlideContent, Topic};
    use std::io::Read;

    fn deck(with_image: bool) -> Deck {
        let kinds = [
            SlideKind::Title,
            SlideKind::Overview,
            SlideKind::KeyPoint,
            SlideKind::KeyPoint,
            SlideKind::KeyPoint,
            SlideKind::KeyPoint,
            SlideKind::Conclusion,
        ];
        let slides = kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| {
                let position = i + 1;
                let image = if with_image && position == 3 {
                    ResolvedImage {
                        position,
                        bytes: vec![0xFF, 0xD8, 0xFF],
                        format: ImageFormat::Jpeg,
                        dimensions: Some((1600, 900)),
                    }
                } else {
                    ResolvedImage::absent(position)
                };
                DeckSlide {
                    kind,
                    content: SlideContent {
                        position,
                        title: format!("Slide <{position}> & more"),
                        bullets: if kind.is_body() {
                            vec!["Sunlight is abundant.".to_string()]
                        } else {
                            Vec::new()
                        },
                        image_query: None,
                    },
                    image,
                }
            })
            .collect();
        Deck {
            topic: Topic::new("Solar Energy").unwrap(),
            slides,
        }
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_package_has_one_part_per_slide() {
        let bytes = PptxWriter::default().render(&deck(false)).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let slides = archive
            .file_names()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .count();
        assert_eq!(slides, 7);
        assert!(archive.file_names().all(|n| !n.starts_with("ppt/media/")));

        let presentation = read_part(&bytes, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 7);
        let rels = read_part(&bytes, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains(r#"Id="rId8""#));
        assert!(rels.contains(r#"Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme""#));
    }

    #[test]
    fn test_title_slide_layout() {
        let bytes = PptxWriter::default().render(&deck(false)).unwrap();
        let slide = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("Slide &lt;1&gt; &amp; more"));
        assert!(slide.contains("A Presentation on Solar Energy"));
        assert!(!slide.contains("a:buChar"));
    }

    #[test]
    fn test_key_point_image_is_embedded_and_fitted() {
        let bytes = PptxWriter::default().render(&deck(true)).unwrap();
        let slide = read_part(&bytes, "ppt/slides/slide3.xml");
        assert!(slide.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(slide.contains(r#"sz="1800""#));
        let rels = read_part(&bytes, "ppt/slides/_rels/slide3.xml.rels");
        assert!(rels.contains("../media/image3.jpeg"));
        let types = read_part(&bytes, "[Content_Types].xml");
        assert!(types.contains(r#"Extension="jpeg""#));

        // Slide 4 has no image: the region stays empty.
        let slide = read_part(&bytes, "ppt/slides/slide4.xml");
        assert!(!slide.contains("<p:pic>"));
    }

    #[test]
    fn test_overview_uses_full_width_text() {
        let bytes = PptxWriter::default().render(&deck(false)).unwrap();
        let slide = read_part(&bytes, "ppt/slides/slide2.xml");
        assert!(slide.contains(r#"sz="1500""#));
        assert!(slide.contains(r#"cx="8229600""#));
    }

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        let wide = IMAGE_REGION.fit(1600, 900);
        assert_eq!(wide.cx, IMAGE_REGION.cx);
        assert!(wide.cy < IMAGE_REGION.cy);
        assert!(wide.y > IMAGE_REGION.y);

        let tall = IMAGE_REGION.fit(300, 900);
        assert_eq!(tall.cy, IMAGE_REGION.cy);
        assert!(tall.cx < IMAGE_REGION.cx);
        assert_eq!(IMAGE_REGION.fit(0, 10), IMAGE_REGION);
    }
}
