// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: opens source documents with `lopdf` and pulls out what the
// conversion pipeline needs per page, the text layer and the scanned image.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pagewright_core::error::{PagewrightError, Result};
use tracing::{debug, info, instrument, warn};

/// Upper bound on /Parent hops when looking for inherited page resources.
const MAX_TREE_DEPTH: usize = 32;

/// Read-only access to an existing PDF.
pub struct PdfReader {
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            PagewrightError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            PagewrightError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Text layer of a 1-indexed page. Scanned pages usually return an empty
    /// or whitespace-only string.
    #[instrument(skip(self))]
    pub fn page_text(&self, page_number: usize) -> Result<String> {
        self.page_id(page_number)?;
        self.document
            .extract_text(&[page_number as u32])
            .map_err(|err| {
                PagewrightError::PdfError(format!(
                    "failed to extract text from page {page_number}: {err}"
                ))
            })
    }

    /// The first decodable image XObject on a 1-indexed page.
    ///
    /// Handles JPEG (DCTDecode) and uncompressed or Flate-compressed 8-bit
    /// grey/RGB samples, which covers what scanners emit in practice. Pages
    /// with no image, or only images in other encodings, yield `Ok(None)`.
    #[instrument(skip(self))]
    pub fn page_image(&self, page_number: usize) -> Result<Option<DynamicImage>> {
        let page_id = self.page_id(page_number)?;
        let Some(resources) = self.page_resources(page_id)? else {
            return Ok(None);
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Ok(None);
        };
        let xobjects = self.resolve_dict(xobjects)?;

        for (name, entry) in xobjects.iter() {
            let Ok((_, target)) = self.document.dereference(entry) else {
                continue;
            };
            let Ok(stream) = target.as_stream() else {
                continue;
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|subtype| subtype == b"Image")
                .unwrap_or(false);
            if !is_image {
                continue;
            }

            match decode_image(stream)? {
                Some(image) => {
                    debug!(
                        page_number,
                        xobject = %String::from_utf8_lossy(name),
                        width = image.width(),
                        height = image.height(),
                        "Page image decoded"
                    );
                    return Ok(Some(image));
                }
                None => warn!(
                    page_number,
                    xobject = %String::from_utf8_lossy(name),
                    "Skipping image in unsupported encoding"
                ),
            }
        }

        Ok(None)
    }

    fn page_id(&self, page_number: usize) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        u32::try_from(page_number)
            .ok()
            .and_then(|n| pages.get(&n).copied())
            .ok_or_else(|| {
                PagewrightError::PdfError(format!(
                    "page {} out of range (document has {} pages)",
                    page_number,
                    pages.len()
                ))
            })
    }

    /// /Resources of a page, following /Parent for inherited entries.
    fn page_resources(&self, page_id: ObjectId) -> Result<Option<&Dictionary>> {
        let mut node = self.document.get_dictionary(page_id).map_err(|err| {
            PagewrightError::PdfError(format!("page object {page_id:?} is not a dictionary: {err}"))
        })?;

        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(resources) = node.get(b"Resources") {
                return self.resolve_dict(resources).map(Some);
            }
            match node.get(b"Parent") {
                Ok(parent) => node = self.resolve_dict(parent)?,
                Err(_) => return Ok(None),
            }
        }

        warn!(?page_id, "Page tree deeper than expected; giving up on resources");
        Ok(None)
    }

    fn resolve_dict<'a>(&'a self, object: &'a Object) -> Result<&'a Dictionary> {
        let (_, target) = self
            .document
            .dereference(object)
            .map_err(|err| PagewrightError::PdfError(format!("dangling reference: {err}")))?;
        target
            .as_dict()
            .map_err(|err| PagewrightError::PdfError(format!("expected a dictionary: {err}")))
    }
}

/// Names listed under /Filter, outermost first.
fn filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

fn dimension(stream: &Stream, key: &[u8]) -> Option<u32> {
    stream
        .dict
        .get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .filter(|&v| v > 0)
}

fn decode_image(stream: &Stream) -> Result<Option<DynamicImage>> {
    let filters = filters(stream);

    match filters.as_slice() {
        [only] if only.as_slice() == b"DCTDecode" => {
            let image = image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .map_err(|err| {
                    PagewrightError::ImageError(format!("failed to decode JPEG page image: {err}"))
                })?;
            Ok(Some(image))
        }
        [] => decode_samples(stream, stream.content.clone()),
        [only] if only.as_slice() == b"FlateDecode" => {
            let data = stream.decompressed_content().map_err(|err| {
                PagewrightError::PdfError(format!("failed to inflate page image: {err}"))
            })?;
            decode_samples(stream, data)
        }
        _ => Ok(None),
    }
}

/// Raw 8-bit samples. The channel count is inferred from the buffer size,
/// which sidesteps indirect or ICC-based /ColorSpace entries.
fn decode_samples(stream: &Stream, data: Vec<u8>) -> Result<Option<DynamicImage>> {
    let bits = stream.dict.get(b"BitsPerComponent").and_then(Object::as_i64).unwrap_or(8);
    let (Some(width), Some(height)) = (dimension(stream, b"Width"), dimension(stream, b"Height"))
    else {
        return Err(PagewrightError::ImageError(
            "page image is missing /Width or /Height".into(),
        ));
    };
    if bits != 8 {
        return Ok(None);
    }

    let pixels = width as usize * height as usize;
    let image = if data.len() == pixels {
        GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
    } else if data.len() == pixels * 3 {
        RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
    } else {
        None
    };
    Ok(image)
}
