//! Metadata extraction from ProQuest ETD exports.
//!
//! A ProQuest export (`*_DATA.xml`) is rooted at `DISS_submission`. This
//! module resolves a fixed set of [`Field`]s from it into a [`MetadataRecord`]:
//!
//! - single-valued fields take the first element matching their path
//! - multi-valued fields (`subject`, `advisor`) take every match, and zero
//!   matches is an empty list
//! - `publisher` and `rightsurl` are literal values from [`SafConfig`]
//!
//! Names are reassembled as `"Last, First Middle"`, and `mimetype`, `extent`
//! and `type` come from element attributes. Any field whose source element is
//! structurally required fails with [`SafError::Structural`] when it is
//! missing. The other single-valued fields become the empty string.
//!
//! # Examples
//!
//! ```ignore
//! use etdsaf::{metadata, xml, SafConfig};
//!
//! let root = xml::parse_file("FOO_DATA.xml".as_ref())?;
//! let record = metadata::extract_metadata(&root, &SafConfig::default())?;
//! println!("{} ({})", record.title, record.author);
//! # Ok::<(), etdsaf::SafError>(())
//! ```

use std::fmt;

use crate::config::SafConfig;
use crate::error::{Result, SafError};
use crate::xml::{XmlElement, XmlPath};

/// How many values a field resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// First match of a path
    Single,
    /// Every match of a path, possibly none
    Multiple,
    /// A configured literal, not read from the document
    Constant,
}

/// A named field of a [`MetadataRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Primary author, as `"Last, First Middle"`
    Author,
    /// Awarding department
    Department,
    /// Copyright date (the acceptance date)
    CopyrightDate,
    /// Issue date (the acceptance date)
    IssueDate,
    /// Degree name
    Degree,
    /// `image/<binary type>`
    Mimetype,
    /// Page count
    Extent,
    /// Language code with `_US` appended
    Language,
    /// Creative Commons license abbreviation, possibly absent
    License,
    /// Dissertation title
    Title,
    /// Dissertation type attribute
    Type,
    /// Keyword element texts, each possibly comma-joined
    Subject,
    /// Advisors, as `"Last, First Middle"`
    Advisor,
    /// Configured publisher literal
    Publisher,
    /// Configured rights URI literal
    RightsUrl,
}

impl Field {
    /// Every field in record order. Dublin Core values are emitted in this order.
    pub const ALL: [Field; 15] = [
        Field::Author,
        Field::Department,
        Field::CopyrightDate,
        Field::IssueDate,
        Field::Degree,
        Field::Mimetype,
        Field::Extent,
        Field::Language,
        Field::License,
        Field::Title,
        Field::Type,
        Field::Subject,
        Field::Advisor,
        Field::Publisher,
        Field::RightsUrl,
    ];

    /// The field's name as used in mapping tables.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Field::Author => "author",
            Field::Department => "department",
            Field::CopyrightDate => "copyrightdate",
            Field::IssueDate => "issuedate",
            Field::Degree => "degree",
            Field::Mimetype => "mimetype",
            Field::Extent => "extent",
            Field::Language => "language",
            Field::License => "license",
            Field::Title => "title",
            Field::Type => "type",
            Field::Subject => "subject",
            Field::Advisor => "advisor",
            Field::Publisher => "publisher",
            Field::RightsUrl => "rightsurl",
        }
    }

    /// Whether the field is single, multiple, or a literal.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Field::Subject | Field::Advisor => Arity::Multiple,
            Field::Publisher | Field::RightsUrl => Arity::Constant,
            _ => Arity::Single,
        }
    }

    /// Lookup path relative to `DISS_submission`, or `None` for literals.
    #[must_use]
    pub const fn source_path(self) -> Option<&'static str> {
        match self {
            Field::Author => Some("DISS_authorship/DISS_author[@type='primary']/DISS_name"),
            Field::Department => Some("DISS_description/DISS_institution/DISS_inst_contact"),
            Field::CopyrightDate | Field::IssueDate => {
                Some("DISS_description/DISS_dates/DISS_accept_date")
            },
            Field::Degree => Some("DISS_description/DISS_degree"),
            Field::Mimetype => Some("DISS_content/DISS_binary"),
            Field::Extent | Field::Type => Some("DISS_description"),
            Field::Language => Some("DISS_description/DISS_categorization/DISS_language"),
            Field::License => Some("DISS_creative_commons_license/DISS_abbreviation"),
            Field::Title => Some("DISS_description/DISS_title"),
            Field::Subject => Some("DISS_description/DISS_categorization/DISS_keyword"),
            Field::Advisor => Some("DISS_description/DISS_advisor/DISS_name"),
            Field::Publisher | Field::RightsUrl => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved field value, borrowed from a [`MetadataRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// One text value
    Single(&'a str),
    /// Zero or more text values
    Multiple(&'a [String]),
    /// The source element was not present
    Missing,
}

/// Metadata resolved from one export document.
///
/// Built once by [`extract_metadata`] and read through [`MetadataRecord::value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Primary author name
    pub author: String,
    /// Department
    pub department: String,
    /// Copyright date
    pub copyright_date: String,
    /// Issue date
    pub issue_date: String,
    /// Degree
    pub degree: String,
    /// Mime type derived from the binary element
    pub mimetype: String,
    /// Page count
    pub extent: String,
    /// Language tag such as `en_US`
    pub language: String,
    /// License text; `None` when the license element is absent
    pub license: Option<String>,
    /// Title
    pub title: String,
    /// Dissertation type
    pub dc_type: String,
    /// Raw keyword element texts
    pub subject: Vec<String>,
    /// Advisor names
    pub advisor: Vec<String>,
    /// Publisher literal
    pub publisher: String,
    /// Rights URI literal
    pub rights_url: String,
}

impl MetadataRecord {
    /// Get the value of a field.
    #[must_use]
    pub fn value(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Author => FieldValue::Single(&self.author),
            Field::Department => FieldValue::Single(&self.department),
            Field::CopyrightDate => FieldValue::Single(&self.copyright_date),
            Field::IssueDate => FieldValue::Single(&self.issue_date),
            Field::Degree => FieldValue::Single(&self.degree),
            Field::Mimetype => FieldValue::Single(&self.mimetype),
            Field::Extent => FieldValue::Single(&self.extent),
            Field::Language => FieldValue::Single(&self.language),
            Field::License => self
                .license
                .as_deref()
                .map_or(FieldValue::Missing, FieldValue::Single),
            Field::Title => FieldValue::Single(&self.title),
            Field::Type => FieldValue::Single(&self.dc_type),
            Field::Subject => FieldValue::Multiple(&self.subject),
            Field::Advisor => FieldValue::Multiple(&self.advisor),
            Field::Publisher => FieldValue::Single(&self.publisher),
            Field::RightsUrl => FieldValue::Single(&self.rights_url),
        }
    }
}

/// Resolve every field of a record from an export's root element.
///
/// # Errors
///
/// Returns [`SafError::Structural`] if the primary author name, the binary
/// element, the description element, or one of their required attributes or
/// name parts is missing.
pub fn extract_metadata(root: &XmlElement, config: &SafConfig) -> Result<MetadataRecord> {
    let lookup = Lookup { root };

    let binary_type = required_attribute(lookup.required(Field::Mimetype)?, Field::Mimetype, "type")?;
    let description = lookup.required(Field::Extent)?;

    let advisor = lookup
        .all(Field::Advisor)?
        .into_iter()
        .map(|name| join_name(name, Field::Advisor))
        .collect::<Result<Vec<_>>>()?;

    Ok(MetadataRecord {
        author: join_name(lookup.required(Field::Author)?, Field::Author)?,
        department: lookup.text(Field::Department)?,
        copyright_date: lookup.text(Field::CopyrightDate)?,
        issue_date: lookup.text(Field::IssueDate)?,
        degree: lookup.text(Field::Degree)?,
        mimetype: format!("image/{binary_type}"),
        extent: required_attribute(description, Field::Extent, "page_count")?,
        language: language_tag(&lookup.text(Field::Language)?),
        license: lookup.first(Field::License)?.map(|el| el.text().to_string()),
        title: lookup.text(Field::Title)?,
        dc_type: required_attribute(lookup.required(Field::Type)?, Field::Type, "type")?,
        subject: lookup
            .all(Field::Subject)?
            .into_iter()
            .map(|kw| kw.text().to_string())
            .collect(),
        advisor,
        publisher: config.publisher.clone(),
        rights_url: config.rights_url.clone(),
    })
}

/// Reassemble a `DISS_name` element as `"Last, First Middle"` or `"Last, First"`.
///
/// # Errors
///
/// Returns [`SafError::Structural`] if `DISS_surname` or `DISS_fname` is missing.
pub fn join_name(name: &XmlElement, field: Field) -> Result<String> {
    let part = move |tag: &str| {
        name.child(tag).map(XmlElement::text).ok_or_else(|| {
            SafError::structural(
                format!("{}/{tag}", field.source_path().unwrap_or_default()),
                format!("{field} name has no {tag}"),
            )
        })
    };
    let last = part("DISS_surname")?;
    let first = part("DISS_fname")?;
    let middle = name.child("DISS_middle").map_or("", XmlElement::text);

    if middle.is_empty() {
        Ok(format!("{last}, {first}"))
    } else {
        Ok(format!("{last}, {first} {middle}"))
    }
}

/// Turn a bare language code into a locale tag (`en` becomes `en_US`).
///
/// An empty code stays empty.
#[must_use]
pub fn language_tag(code: &str) -> String {
    if code.is_empty() {
        String::new()
    } else {
        format!("{code}_US")
    }
}

fn required_attribute(element: &XmlElement, field: Field, attr: &str) -> Result<String> {
    element
        .attribute(attr)
        .map(str::to_lowercase)
        .ok_or_else(|| {
            SafError::structural(
                field.source_path().unwrap_or_default(),
                format!("{field} requires attribute '{attr}'"),
            )
        })
}

struct Lookup<'a> {
    root: &'a XmlElement,
}

impl<'a> Lookup<'a> {
    fn path(field: Field) -> Result<XmlPath> {
        let raw = field
            .source_path()
            .ok_or_else(|| SafError::Xml(format!("{field} is not read from the document")))?;
        XmlPath::parse(raw)
    }

    fn first(&self, field: Field) -> Result<Option<&'a XmlElement>> {
        Ok(self.root.find(&Self::path(field)?))
    }

    fn required(&self, field: Field) -> Result<&'a XmlElement> {
        let path = Self::path(field)?;
        self.root.find(&path).ok_or_else(|| {
            SafError::structural(path.as_str(), format!("{field} source element is missing"))
        })
    }

    fn text(&self, field: Field) -> Result<String> {
        Ok(self
            .first(field)?
            .map(|el| el.text().to_string())
            .unwrap_or_default())
    }

    fn all(&self, field: Field) -> Result<Vec<&'a XmlElement>> {
        Ok(self.root.find_all(&Self::path(field)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn submission(body: &str) -> XmlElement {
        parse_document(&format!("<DISS_submission>{body}</DISS_submission>")).expect("parse")
    }

    const MINIMAL: &str = r#"
        <DISS_authorship><DISS_author type="primary"><DISS_name>
          <DISS_surname>Doe</DISS_surname><DISS_fname>Jane</DISS_fname><DISS_middle/>
        </DISS_name></DISS_author></DISS_authorship>
        <DISS_description page_count="120" type="Doctoral"/>
        <DISS_content><DISS_binary type="PDF">FOO.pdf</DISS_binary></DISS_content>"#;

    #[test]
    fn test_minimal_document_degrades_to_empty() {
        let record = extract_metadata(&submission(MINIMAL), &SafConfig::default()).expect("extract");
        assert_eq!(record.author, "Doe, Jane");
        assert_eq!(record.mimetype, "image/pdf");
        assert_eq!(record.extent, "120");
        assert_eq!(record.dc_type, "doctoral");
        assert_eq!(record.title, "");
        assert_eq!(record.language, "");
        assert_eq!(record.license, None);
        assert!(record.subject.is_empty());
        assert!(record.advisor.is_empty());
        assert_eq!(record.publisher, "University of Chicago");
    }

    #[test]
    fn test_middle_name() {
        let root = submission(
            "<DISS_name><DISS_surname>Doe</DISS_surname><DISS_fname>Jane</DISS_fname>\
             <DISS_middle>Q.</DISS_middle></DISS_name>",
        );
        let name = root.child("DISS_name").expect("name");
        assert_eq!(join_name(name, Field::Author).expect("join"), "Doe, Jane Q.");
    }

    #[test]
    fn test_missing_author_is_structural() {
        let body = MINIMAL.replace("type=\"primary\"", "type=\"additional\"");
        let err = extract_metadata(&submission(&body), &SafConfig::default()).unwrap_err();
        assert!(matches!(err, SafError::Structural { .. }));
    }

    #[test]
    fn test_missing_name_part_is_structural() {
        let body = MINIMAL.replace("<DISS_fname>Jane</DISS_fname>", "");
        let err = extract_metadata(&submission(&body), &SafConfig::default()).unwrap_err();
        assert!(err.to_string().contains("DISS_fname"));
    }

    #[test]
    fn test_missing_binary_is_structural() {
        let body = MINIMAL.replace("<DISS_binary type=\"PDF\">FOO.pdf</DISS_binary>", "");
        let err = extract_metadata(&submission(&body), &SafConfig::default()).unwrap_err();
        match err {
            SafError::Structural { path, .. } => assert_eq!(path, "DISS_content/DISS_binary"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_page_count_is_structural() {
        let body = MINIMAL.replace("page_count=\"120\" ", "");
        let err = extract_metadata(&submission(&body), &SafConfig::default()).unwrap_err();
        assert!(err.to_string().contains("page_count"));
    }

    #[test]
    fn test_language_tag() {
        assert_eq!(language_tag("en"), "en_US");
        assert_eq!(language_tag(""), "");
    }

    #[test]
    fn test_license_present_but_empty() {
        let body = format!(
            "{MINIMAL}<DISS_creative_commons_license><DISS_abbreviation/>\
             </DISS_creative_commons_license>"
        );
        let record = extract_metadata(&submission(&body), &SafConfig::default()).expect("extract");
        assert_eq!(record.license.as_deref(), Some(""));
        assert_eq!(record.value(Field::License), FieldValue::Single(""));
    }

    #[test]
    fn test_every_document_field_has_a_valid_path() {
        for field in Field::ALL {
            match (field.arity(), field.source_path()) {
                (Arity::Constant, path) => assert!(path.is_none(), "{field}"),
                (_, Some(path)) => assert!(XmlPath::parse(path).is_ok(), "{field}"),
                (_, None) => panic!("{field} has no source path"),
            }
        }
    }
}
