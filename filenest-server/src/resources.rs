//! Static assets compiled into the binary

use bytes::Bytes;
use filenest_core::range::{content_stamp, entity_tag};

/// A built-in resource served from memory
#[derive(Debug)]
pub struct Resource {
    pub name: &'static str,
    pub mime: &'static str,
    pub data: &'static [u8],
}

pub static FAVICON: Resource = Resource {
    name: "favicon.ico",
    mime: "image/x-icon",
    data: include_bytes!("../resources/favicon.ico"),
};

pub static STYLESHEET: Resource = Resource {
    name: "style.css",
    mime: "text/css",
    data: include_bytes!("../resources/style.css"),
};

/// Resources reachable under `/resources/<name>`
static NAMED: [&Resource; 2] = [&STYLESHEET, &FAVICON];

pub fn find(name: &str) -> Option<&'static Resource> {
    NAMED.iter().copied().find(|resource| resource.name == name)
}

impl Resource {
    pub fn etag(&self) -> String {
        entity_tag(content_stamp(self.data), self.data.len() as u64)
    }

    pub fn bytes(&self) -> Bytes {
        Bytes::from_static(self.data)
    }
}
