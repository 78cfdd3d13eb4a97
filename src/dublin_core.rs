//! Dublin Core mapping of extracted ETD metadata.
//!
//! This module turns a [`MetadataRecord`] into a [`DublinCoreRecord`]: an
//! ordered list of `(element, qualifier, value)` triples in the qualified
//! Dublin Core dialect that DSpace batch import reads from `dublin_core` files.
//!
//! The mapping is driven by the static [`FIELD_MAPPINGS`] table. Each entry
//! names a [`Field`], its Dublin Core element and qualifier, and a
//! [`Transform`] that turns the field's resolved value into zero or more
//! emitted values:
//!
//! | Field           | Element       | Qualifier    | Transform          |
//! |-----------------|---------------|--------------|--------------------|
//! | `advisor`       | `contributor` | `advisor`    | identity           |
//! | `author`        | `contributor` | `author`     | identity           |
//! | `department`    | `contributor` | `department` | identity           |
//! | `copyrightdate` | `date`        | `copyright`  | identity           |
//! | `issuedate`     | `date`        | `issued`     | identity           |
//! | `degree`        | `description` | `degree`     | identity           |
//! | `mimetype`      | `format`      | `mimetype`   | identity           |
//! | `extent`        | `format`      | `extent`     | identity           |
//! | `language`      | `language`    | `iso`        | identity           |
//! | `publisher`     | `publisher`   | `none`       | identity           |
//! | `license`       | `rights`      | `none`       | default substitute |
//! | `rightsurl`     | `rights`      | `uri`        | identity           |
//! | `subject`       | `subject`     | `none`       | comma split        |
//! | `title`         | `title`       | `none`       | identity           |
//! | `type`          | `type`        | `none`       | identity           |
//!
//! Values are emitted in record field order ([`Field::ALL`]), not table order.
//!
//! # Examples
//!
//! ```ignore
//! use etdsaf::dublin_core::{dublin_core_to_xml, map_to_dublin_core};
//!
//! let dc = map_to_dublin_core(&record);
//! std::fs::write("dublin_core", dublin_core_to_xml(&dc))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt::Write;

use crate::metadata::{Field, FieldValue, MetadataRecord};

/// Rights statement used when a record carries no usable license.
pub const DEFAULT_RIGHTS: &str = "University of Chicago dissertations are covered by \
    copyright. They may be viewed from this source for any purpose, but reproduction or \
    distribution in any format is prohibited without written permission.";

/// Qualifier written for unqualified elements.
pub const NO_QUALIFIER: &str = "none";

/// How a field's resolved value becomes emitted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// One value per resolved value; a missing element emits the empty string.
    Identity,
    /// Use the mapping default when the value is missing, empty, or `"none"`.
    DefaultSubstitute,
    /// Split every non-empty value on commas, one emitted value per piece.
    /// Pieces are not trimmed.
    CommaSplit,
}

impl Transform {
    /// Apply this transform to a field value.
    #[must_use]
    pub fn apply(self, value: FieldValue<'_>, default_value: Option<&str>) -> Vec<String> {
        match self {
            Transform::Identity => match value {
                FieldValue::Single(text) => vec![text.to_string()],
                FieldValue::Multiple(texts) => texts.to_vec(),
                FieldValue::Missing => vec![String::new()],
            },
            Transform::DefaultSubstitute => {
                let text = match value {
                    FieldValue::Single(text) => text,
                    FieldValue::Multiple(texts) => texts.first().map_or("", String::as_str),
                    FieldValue::Missing => "",
                };
                if text.is_empty() || text == "none" {
                    vec![default_value.unwrap_or_default().to_string()]
                } else {
                    vec![text.to_string()]
                }
            },
            Transform::CommaSplit => {
                let texts: &[String] = match value {
                    FieldValue::Multiple(texts) => texts,
                    FieldValue::Single(text) => return split_keywords(text),
                    FieldValue::Missing => &[],
                };
                texts.iter().flat_map(|text| split_keywords(text)).collect()
            },
        }
    }
}

fn split_keywords(text: &str) -> Vec<String> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split(',').map(str::to_string).collect()
    }
}

/// One entry of the field mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Source field
    pub field: Field,
    /// Dublin Core element name
    pub element: &'static str,
    /// Dublin Core qualifier, `"none"` when unqualified
    pub qualifier: &'static str,
    /// Substitute for an empty or `"none"` value
    pub default_value: Option<&'static str>,
    /// Value transformation
    pub transform: Transform,
}

const fn mapping(field: Field, element: &'static str, qualifier: &'static str) -> FieldMapping {
    FieldMapping {
        field,
        element,
        qualifier,
        default_value: None,
        transform: Transform::Identity,
    }
}

/// Field to Dublin Core mapping table.
pub const FIELD_MAPPINGS: &[FieldMapping] = &[
    mapping(Field::Advisor, "contributor", "advisor"),
    mapping(Field::Author, "contributor", "author"),
    mapping(Field::Department, "contributor", "department"),
    mapping(Field::CopyrightDate, "date", "copyright"),
    mapping(Field::IssueDate, "date", "issued"),
    mapping(Field::Degree, "description", "degree"),
    mapping(Field::Mimetype, "format", "mimetype"),
    mapping(Field::Extent, "format", "extent"),
    mapping(Field::Language, "language", "iso"),
    mapping(Field::Publisher, "publisher", NO_QUALIFIER),
    FieldMapping {
        field: Field::License,
        element: "rights",
        qualifier: NO_QUALIFIER,
        default_value: Some(DEFAULT_RIGHTS),
        transform: Transform::DefaultSubstitute,
    },
    mapping(Field::RightsUrl, "rights", "uri"),
    FieldMapping {
        field: Field::Subject,
        element: "subject",
        qualifier: NO_QUALIFIER,
        default_value: None,
        transform: Transform::CommaSplit,
    },
    mapping(Field::Title, "title", NO_QUALIFIER),
    mapping(Field::Type, "type", NO_QUALIFIER),
];

/// Look up the mapping entry for a field.
#[must_use]
pub fn mapping_for(field: Field) -> Option<&'static FieldMapping> {
    FIELD_MAPPINGS.iter().find(|m| m.field == field)
}

/// A single qualified Dublin Core value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcValue {
    /// Element name, e.g. `contributor`
    pub element: String,
    /// Qualifier, e.g. `author`, or `none`
    pub qualifier: String,
    /// Text value
    pub value: String,
}

/// Dublin Core metadata record for one SAF item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DublinCoreRecord {
    values: Vec<DcValue>,
}

impl DublinCoreRecord {
    /// All values in emission order.
    #[must_use]
    pub fn values(&self) -> &[DcValue] {
        &self.values
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values carrying the given element and qualifier, in order.
    #[must_use]
    pub fn get(&self, element: &str, qualifier: &str) -> Vec<&str> {
        self.values
            .iter()
            .filter(|v| v.element == element && v.qualifier == qualifier)
            .map(|v| v.value.as_str())
            .collect()
    }
}

impl FromIterator<DcValue> for DublinCoreRecord {
    fn from_iter<I: IntoIterator<Item = DcValue>>(iter: I) -> Self {
        DublinCoreRecord {
            values: iter.into_iter().collect(),
        }
    }
}

/// Map extracted metadata to Dublin Core.
///
/// Walks [`Field::ALL`] and emits, for each field with a table entry, one
/// value per transformed output, all sharing that entry's element and
/// qualifier. The result depends only on `record`.
#[must_use]
pub fn map_to_dublin_core(record: &MetadataRecord) -> DublinCoreRecord {
    Field::ALL
        .iter()
        .filter_map(|&field| mapping_for(field).map(|m| (m, record.value(field))))
        .flat_map(|(m, value)| {
            m.transform
                .apply(value, m.default_value)
                .into_iter()
                .map(move |text| DcValue {
                    element: m.element.to_string(),
                    qualifier: m.qualifier.to_string(),
                    value: text,
                })
        })
        .collect()
}

/// Serialize a Dublin Core record in DSpace `dublin_core` file format.
#[must_use]
pub fn dublin_core_to_xml(dc: &DublinCoreRecord) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<dublin_core>\n");

    for value in dc.values() {
        writeln!(
            xml,
            "  <dcvalue element=\"{}\" qualifier=\"{}\">{}</dcvalue>",
            escape_xml(&value.element),
            escape_xml(&value.qualifier),
            escape_xml(&value.value)
        )
        .ok();
    }

    xml.push_str("</dublin_core>\n");
    xml
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn make_test_record() -> MetadataRecord {
        MetadataRecord {
            author: "Doe, Jane Q.".to_string(),
            department: "Department of History".to_string(),
            copyright_date: "2017".to_string(),
            issue_date: "2017".to_string(),
            degree: "Ph.D.".to_string(),
            mimetype: "image/pdf".to_string(),
            extent: "212".to_string(),
            language: "en_US".to_string(),
            license: None,
            title: "A History of Things".to_string(),
            dc_type: "doctoral".to_string(),
            subject: vec!["history, philosophy,ethics".to_string()],
            advisor: vec!["Roe, Richard".to_string(), "Poe, Edgar A.".to_string()],
            publisher: "University of Chicago".to_string(),
            rights_url: "http://doi.org/10.6082/M1CC0XM8".to_string(),
        }
    }

    #[test]
    fn test_every_field_is_mapped() {
        for field in Field::ALL {
            assert!(mapping_for(field).is_some(), "{field} has no mapping");
        }
    }

    #[test]
    fn test_subject_split_without_trimming() {
        let dc = map_to_dublin_core(&make_test_record());
        assert_eq!(dc.get("subject", "none"), vec!["history", " philosophy", "ethics"]);
    }

    #[test]
    fn test_empty_keyword_emits_nothing() {
        let mut record = make_test_record();
        record.subject = vec![String::new(), "a".to_string()];
        let dc = map_to_dublin_core(&record);
        assert_eq!(dc.get("subject", "none"), vec!["a"]);
    }

    #[test]
    fn test_license_default_substitution() {
        for license in [None, Some(""), Some("none")] {
            let mut record = make_test_record();
            record.license = license.map(str::to_string);
            let dc = map_to_dublin_core(&record);
            assert_eq!(dc.get("rights", "none"), vec![DEFAULT_RIGHTS]);
        }
    }

    #[test]
    fn test_license_verbatim() {
        let mut record = make_test_record();
        record.license = Some("CC BY".to_string());
        let dc = map_to_dublin_core(&record);
        assert_eq!(dc.get("rights", "none"), vec!["CC BY"]);
    }

    #[test]
    fn test_advisors_share_element_and_qualifier() {
        let dc = map_to_dublin_core(&make_test_record());
        assert_eq!(
            dc.get("contributor", "advisor"),
            vec!["Roe, Richard", "Poe, Edgar A."]
        );
    }

    #[test]
    fn test_no_advisors_or_subjects() {
        let mut record = make_test_record();
        record.subject.clear();
        record.advisor.clear();
        let dc = map_to_dublin_core(&record);
        assert!(dc.get("subject", "none").is_empty());
        assert!(dc.get("contributor", "advisor").is_empty());
        assert_eq!(dc.len(), 13);
    }

    #[test]
    fn test_emission_follows_record_order() {
        let dc = map_to_dublin_core(&make_test_record());
        let order: Vec<(&str, &str)> = dc
            .values()
            .iter()
            .map(|v| (v.element.as_str(), v.qualifier.as_str()))
            .collect();
        assert_eq!(order[0], ("contributor", "author"));
        assert_eq!(order[1], ("contributor", "department"));
        assert_eq!(order[5], ("format", "mimetype"));
        assert_eq!(order[8], ("rights", "none"));
        assert_eq!(order[order.len() - 2], ("publisher", "none"));
        assert_eq!(order[order.len() - 1], ("rights", "uri"));
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let record = make_test_record();
        let first = dublin_core_to_xml(&map_to_dublin_core(&record));
        let second = dublin_core_to_xml(&map_to_dublin_core(&record));
        assert_eq!(first, second);
    }

    #[test]
    fn test_xml_is_well_formed() {
        let dc = map_to_dublin_core(&make_test_record());
        let xml = dublin_core_to_xml(&dc);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));

        let root = parse_document(&xml).expect("well-formed");
        assert_eq!(root.name, "dublin_core");
        assert_eq!(root.children.len(), dc.len());
        let first = &root.children[0];
        assert_eq!(first.name, "dcvalue");
        assert_eq!(first.attribute("element"), Some("contributor"));
        assert_eq!(first.attribute("qualifier"), Some("author"));
        assert_eq!(first.text(), "Doe, Jane Q.");
    }

    #[test]
    fn test_xml_escaping() {
        let mut record = make_test_record();
        record.title = "Fish & <Chips>".to_string();
        let xml = dublin_core_to_xml(&map_to_dublin_core(&record));

        assert!(xml.contains("Fish &amp; &lt;Chips&gt;"));
        let root = parse_document(&xml).expect("well-formed");
        let title = root
            .children
            .iter()
            .find(|c| c.attribute("element") == Some("title"))
            .expect("title");
        assert_eq!(title.text(), "Fish & <Chips>");
    }
}
