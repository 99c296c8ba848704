//! `.api_filters` document loading.
//!
//! ```xml
//! <component id="org.example.core" version="2">
//!   <resource path="src/org/example/Api.java" type="org.example.Api">
//!     <filter id="1211105284" comment="accepted">
//!       <message_arguments>
//!         <message_argument value="foo()"/>
//!       </message_arguments>
//!     </filter>
//!   </resource>
//! </component>
//! ```

use super::store::{ApiProblemFilter, FilteredProblem};
use super::{CURRENT_STORE_VERSION, FILTER_FILE_NAME, SETTINGS_FOLDER};
use crate::error::{ApiToolsError, LoadErrorKind, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct ComponentXml {
    #[serde(rename = "@id", default)]
    id: String,
    #[serde(rename = "@version", default)]
    version: String,
    #[serde(rename = "resource", default)]
    resources: Vec<ResourceXml>,
}

#[derive(Debug, Deserialize)]
struct ResourceXml {
    #[serde(rename = "@path", default)]
    path: String,
    #[serde(rename = "@type", default)]
    type_name: String,
    #[serde(rename = "filter", default)]
    filters: Vec<FilterXml>,
}

#[derive(Debug, Deserialize)]
struct FilterXml {
    #[serde(rename = "@id", default)]
    id: String,
    #[serde(rename = "@comment", default)]
    comment: String,
    #[serde(rename = "message_arguments", default)]
    message_arguments: Vec<MessageArgumentsXml>,
}

#[derive(Debug, Deserialize)]
struct MessageArgumentsXml {
    #[serde(rename = "message_argument", default)]
    arguments: Vec<MessageArgumentXml>,
}

#[derive(Debug, Deserialize)]
struct MessageArgumentXml {
    #[serde(rename = "@value", default)]
    value: String,
}

/// Integer attribute, `-1` when absent or not a number.
fn integer_attribute(value: &str) -> i64 {
    value.parse().unwrap_or(-1)
}

/// Name of the document's root element.
fn root_element_name(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Parse a filter document into filters owned by `component_id`.
///
/// Malformed content is never an error: a wrong root, an empty component id
/// or a store version other than the current one yields no filters, and
/// entries with a non-positive id or without exactly one
/// `message_arguments` element are skipped.
pub fn parse_filters(component_id: &str, xml: &str) -> Vec<ApiProblemFilter> {
    if root_element_name(xml).as_deref() != Some("component") {
        debug!("filter document for {component_id} has no <component> root");
        return Vec::new();
    }
    let document: ComponentXml = match quick_xml::de::from_str(xml) {
        Ok(document) => document,
        Err(e) => {
            warn!("ignoring malformed filter document for {component_id}: {e}");
            return Vec::new();
        }
    };
    if document.id.is_empty() {
        return Vec::new();
    }
    let version = if document.version.is_empty() {
        0
    } else {
        document.version.parse::<i64>().unwrap_or(0)
    };
    if version != i64::from(CURRENT_STORE_VERSION) {
        debug!(
            "filter document for {component_id} has version {version}, expected {CURRENT_STORE_VERSION}"
        );
        return Vec::new();
    }

    let mut filters = Vec::new();
    for resource in document.resources {
        let type_name = (!resource.type_name.is_empty()).then_some(resource.type_name);
        let path = (!resource.path.is_empty()).then_some(resource.path);
        for entry in resource.filters {
            let id = integer_attribute(&entry.id);
            let Ok(id) = u32::try_from(id) else {
                continue;
            };
            if id == 0 {
                continue;
            }
            let [arguments] = entry.message_arguments.as_slice() else {
                continue;
            };
            let problem = FilteredProblem {
                id,
                type_name: type_name.clone(),
                resource_path: path.clone(),
                arguments: arguments.arguments.iter().map(|a| a.value.clone()).collect(),
            };
            let comment = (!entry.comment.is_empty()).then_some(entry.comment);
            filters.push(ApiProblemFilter::new(component_id, problem).with_comment(comment));
        }
    }
    filters
}

/// Read the filter document of a component, if it has one.
///
/// `location` is either a `.jar` archive carrying the document at its root
/// or a project folder carrying it under `.settings/`.
pub fn read_filter_document(location: &Path) -> Result<Option<String>> {
    let is_archive = location
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
        && location.is_file();

    if is_archive {
        let file = std::fs::File::open(location).map_err(|e| ApiToolsError::io(location, e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| {
            ApiToolsError::load(
                format!("opening {}", location.display()),
                LoadErrorKind::InvalidArchive(e.to_string()),
            )
        })?;
        let mut entry = match archive.by_name(FILTER_FILE_NAME) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(ApiToolsError::load(
                    format!("reading {FILTER_FILE_NAME} from {}", location.display()),
                    LoadErrorKind::InvalidArchive(e.to_string()),
                ))
            }
        };
        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| ApiToolsError::io(location, e))?;
        Ok(Some(xml))
    } else {
        let path = location.join(SETTINGS_FOLDER).join(FILTER_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| ApiToolsError::io(&path, e))
    }
}
