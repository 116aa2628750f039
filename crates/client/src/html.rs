//! Anti-forgery token extraction from the server-rendered settings page.

use scraper::{ElementRef, Html, Node};
use swi_domain::error::{Error, Result};

/// `name` attribute value of the meta element carrying the token.
pub const CSRF_META_NAME: &str = "csrf-token";

/// The two document layouts the settings page is served in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// `<!DOCTYPE html><html><head>…`: head is the doctype's next
    /// sibling's first child.
    Doctype,
    /// `<html><head>…`: head is the root's first child's first child.
    Bare,
}

impl DocumentShape {
    fn of(first_child: &Node) -> Self {
        if first_child.is_doctype() {
            DocumentShape::Doctype
        } else {
            DocumentShape::Bare
        }
    }
}

/// Locate `<head>` according to the document's shape.
pub fn locate_head(document: &Html) -> Option<ElementRef<'_>> {
    let first = document.tree.root().first_child()?;
    let html = match DocumentShape::of(first.value()) {
        DocumentShape::Doctype => first.next_sibling()?,
        DocumentShape::Bare => first,
    };
    html.first_child()
        .and_then(ElementRef::wrap)
        .filter(|head| head.value().name() == "head")
}

/// Extract the CSRF token from `<meta name="csrf-token" content="…">`.
///
/// Only the head's immediate children are considered, and only meta
/// elements whose attribute set is exactly `{name, content}`. The first
/// non-empty `content` wins.
pub fn extract_csrf_token(document: &Html) -> Result<String> {
    let head = locate_head(document).ok_or(Error::TokenMissing)?;

    head.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "meta")
        .filter(|el| el.value().attrs().count() == 2)
        .filter(|el| el.value().attr("name") == Some(CSRF_META_NAME))
        .filter_map(|el| el.value().attr("content"))
        .find(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or(Error::TokenMissing)
}
