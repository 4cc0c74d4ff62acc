//! Document assembly
//!
//! Blocks arrive from the scanners in arbitrary order; each contributes
//! at most one `<api>` or `<apidoc>` root. [`ApiDoc::parse`] decodes a
//! block and merges it, enforcing the document-wide uniqueness rules.
//! [`ApiDoc::delete_uri`] retracts a file's contribution for the LSP.

use srcdoc_core::{Block, ErrorKind, Location, MessageHandler, Position, Range, SyntaxError, Uri};
use srcdoc_xml::{decode_root, Parser, Search, Tip, Token};

use crate::elements::{Api, ApiDoc};

/// Anything shorter cannot hold a root element
const MIN_DOC_SIZE: usize = "<api/>".len();

/// How two APIs may collide document-wide
pub(crate) enum ApiConflict {
    /// Same explicit `id`
    Id,
    /// Same `(method, path)` pair
    MethodPath,
}

/// Check the document-wide uniqueness rules between two APIs
pub(crate) fn api_conflict(existing: &Api, candidate: &Api) -> Option<ApiConflict> {
    if let (Some(a), Some(b)) = (&existing.id, &candidate.id) {
        if !a.raw().is_empty() && a.raw() == b.raw() {
            return Some(ApiConflict::Id);
        }
    }

    let method = |api: &Api| api.method.as_ref().map(|m| m.method().to_string());
    let path = |api: &Api| {
        api.path
            .as_ref()
            .and_then(|p| p.path.as_ref())
            .map(|a| a.raw().to_string())
    };
    if let (Some(m1), Some(m2), Some(p1), Some(p2)) = (
        method(existing),
        method(candidate),
        path(existing),
        path(candidate),
    ) {
        if !m1.is_empty() && m1 == m2 && !p1.is_empty() && p1 == p2 {
            return Some(ApiConflict::MethodPath);
        }
    }

    None
}

/// Find the root element's local name without consuming the block
///
/// Leading text, comments and instructions are skipped. Anything that
/// fails to tokenize before a start element appears is treated as an
/// ordinary (non-documentation) comment, not an error.
fn root_tag_name(p: &mut Parser<'_>) -> Option<String> {
    let start = p.position();
    loop {
        match p.token() {
            Err(_) | Ok(None) => return None,
            Ok(Some(Token::Start(s))) => {
                let name = s.name.local.value.clone();
                p.move_to(start);
                return Some(name);
            }
            Ok(Some(Token::End(_) | Token::CData(_))) => return None,
            Ok(Some(_)) => {}
        }
    }
}

impl ApiDoc {
    /// Decode one comment block and merge its contents
    ///
    /// Returns true when the block contributed a root element. Blocks
    /// that are not documentation at all are skipped silently; blocks
    /// that are documentation but malformed report through `h`.
    pub fn parse(&mut self, h: &MessageHandler, block: &Block) -> bool {
        if block.data.len() < MIN_DOC_SIZE {
            return false;
        }

        let mut p = Parser::new(block);
        let Some(root) = root_tag_name(&mut p) else {
            return false;
        };

        match root.as_str() {
            "api" => {
                let Some(mut api) = decode_root::<Api>(&mut p, h, "usage-api") else {
                    return false;
                };
                api.uri = block.location.uri.clone();
                self.merge_api(h, api);
                true
            }
            "apidoc" => {
                if self.title.is_some() {
                    h.error(SyntaxError::new(
                        block.location.clone(),
                        "apidoc",
                        ErrorKind::DuplicateValue,
                    ));
                    return false;
                }
                let Some(mut doc) = decode_root::<ApiDoc>(&mut p, h, "usage-apidoc") else {
                    return false;
                };
                doc.uri = block.location.uri.clone();
                self.absorb(h, doc);
                true
            }
            _ => false,
        }
    }

    /// Take over a freshly decoded `<apidoc>` root
    ///
    /// Metadata replaces ours (we had none: duplicate roots were
    /// rejected before decoding); APIs merge one by one so the
    /// uniqueness rules see APIs parsed from other files first.
    fn absorb(&mut self, h: &MessageHandler, doc: ApiDoc) {
        let ApiDoc {
            base,
            apidoc,
            lang,
            logo,
            created,
            version,
            title,
            description,
            contact,
            license,
            tags,
            servers,
            apis,
            headers,
            responses,
            mimetypes,
            xml_namespaces,
            uri,
        } = doc;

        self.base = base;
        self.apidoc = apidoc;
        self.lang = lang;
        self.logo = logo;
        self.created = created;
        self.version = version;
        self.title = title;
        self.description = description;
        self.contact = contact;
        self.license = license;
        self.tags = tags;
        self.servers = servers;
        self.headers = headers;
        self.responses = responses;
        self.mimetypes = mimetypes;
        self.xml_namespaces = xml_namespaces;
        self.uri = uri;

        for mut api in apis {
            if api.uri.is_empty() {
                api.uri = self.uri.clone();
            }
            self.merge_api(h, api);
        }
    }

    /// Append one `<api>`, reporting document-wide duplicates
    ///
    /// The API is appended even when it collides, so position lookups
    /// keep working; the collision is reported exactly once, pinned to
    /// the newcomer.
    pub fn merge_api(&mut self, h: &MessageHandler, api: Api) {
        for existing in &self.apis {
            match api_conflict(existing, &api) {
                Some(ApiConflict::Id) => {
                    let range = api.id.as_ref().map_or(api.base.range, |a| a.base.value_range);
                    h.error(SyntaxError::new(
                        Location::new(api.uri.clone(), range),
                        "id",
                        ErrorKind::DuplicateValue,
                    ));
                    break;
                }
                Some(ApiConflict::MethodPath) => {
                    let range = api.method.as_ref().map_or(api.base.range, |a| a.base.range);
                    h.error(SyntaxError::new(
                        Location::new(api.uri.clone(), range),
                        "method",
                        ErrorKind::DuplicateValue,
                    ));
                    break;
                }
                None => {}
            }
        }
        self.apis.push(api);
    }

    /// Drop everything a file contributed
    ///
    /// APIs from the file are removed; if the file owned the root
    /// `<apidoc>` element the metadata is cleared while surviving APIs
    /// remain.
    pub fn delete_uri(&mut self, uri: &Uri) {
        self.apis.retain(|api| &api.uri != uri);
        if &self.uri == uri {
            let apis = std::mem::take(&mut self.apis);
            *self = ApiDoc {
                apis,
                ..ApiDoc::default()
            };
        }
    }

    /// The innermost tip at a position in `uri`, for editor hovers
    pub fn search(&self, uri: &Uri, pos: Position) -> Option<Tip> {
        for api in &self.apis {
            if &api.uri == uri {
                if let Some(tip) = api.search_tip(pos) {
                    return Some(tip);
                }
            }
        }

        if &self.uri != uri || !self.base.range.contains(pos) {
            return None;
        }
        self.apidoc
            .search_tip(pos)
            .or_else(|| self.lang.search_tip(pos))
            .or_else(|| self.logo.search_tip(pos))
            .or_else(|| self.created.search_tip(pos))
            .or_else(|| self.version.search_tip(pos))
            .or_else(|| self.title.search_tip(pos))
            .or_else(|| self.description.search_tip(pos))
            .or_else(|| self.contact.search_tip(pos))
            .or_else(|| self.license.search_tip(pos))
            .or_else(|| self.tags.search_tip(pos))
            .or_else(|| self.servers.search_tip(pos))
            .or_else(|| self.headers.search_tip(pos))
            .or_else(|| self.responses.search_tip(pos))
            .or_else(|| self.mimetypes.search_tip(pos))
            .or_else(|| self.xml_namespaces.search_tip(pos))
            .or_else(|| self.base.tip())
    }

    /// Whether the document holds neither metadata nor APIs
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.apis.is_empty()
    }
}

/// Build a block at the zero position, for tests and buffers
pub fn block_from(uri: Uri, data: impl Into<Vec<u8>>) -> Block {
    Block::new(Location::new(uri, Range::default()), data.into())
}
