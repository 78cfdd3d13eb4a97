//! Common test helpers and utilities shared across test suite.

use std::fs;
use std::path::{Path, PathBuf};

/// Options for a generated `*_DATA.xml` export.
pub struct ExportFixture<'a> {
    pub surname: &'a str,
    pub fname: &'a str,
    pub middle: &'a str,
    pub title: &'a str,
    pub keywords: &'a [&'a str],
    pub advisors: &'a [(&'a str, &'a str)],
    /// `None` omits the license element entirely
    pub license: Option<&'a str>,
    /// `None` omits `DISS_binary`
    pub binary_type: Option<&'a str>,
}

impl Default for ExportFixture<'_> {
    fn default() -> Self {
        ExportFixture {
            surname: "Doe",
            fname: "Jane",
            middle: "",
            title: "A Study of Things",
            keywords: &["history, philosophy"],
            advisors: &[("Roe", "Richard")],
            license: Some(""),
            binary_type: Some("PDF"),
        }
    }
}

/// Render a ProQuest `DISS_submission` document.
#[allow(dead_code)]
pub fn export_xml(fixture: &ExportFixture<'_>) -> String {
    let keywords: String = fixture
        .keywords
        .iter()
        .map(|k| format!("<DISS_keyword>{k}</DISS_keyword>"))
        .collect();
    let advisors: String = fixture
        .advisors
        .iter()
        .map(|(surname, fname)| {
            format!(
                "<DISS_advisor><DISS_name><DISS_surname>{surname}</DISS_surname>\
                 <DISS_fname>{fname}</DISS_fname><DISS_middle/></DISS_name></DISS_advisor>"
            )
        })
        .collect();
    let license = fixture
        .license
        .map(|l| {
            format!(
                "<DISS_creative_commons_license><DISS_abbreviation>{l}</DISS_abbreviation>\
                 </DISS_creative_commons_license>"
            )
        })
        .unwrap_or_default();
    let binary = fixture
        .binary_type
        .map(|t| format!("<DISS_binary type=\"{t}\">FOO.pdf</DISS_binary>"))
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<DISS_submission publishing_option="0" embargo_code="0">
  <DISS_authorship>
    <DISS_author type="primary">
      <DISS_name>
        <DISS_surname>{surname}</DISS_surname>
        <DISS_fname>{fname}</DISS_fname>
        <DISS_middle>{middle}</DISS_middle>
      </DISS_name>
    </DISS_author>
  </DISS_authorship>
  <DISS_description page_count="212" type="doctoral">
    <DISS_title>{title}</DISS_title>
    <DISS_dates>
      <DISS_comp_date>2017</DISS_comp_date>
      <DISS_accept_date>01/01/2017</DISS_accept_date>
    </DISS_dates>
    <DISS_degree>Ph.D.</DISS_degree>
    <DISS_institution>
      <DISS_inst_name>The University of Chicago</DISS_inst_name>
      <DISS_inst_contact>History</DISS_inst_contact>
    </DISS_institution>
    {advisors}
    <DISS_categorization>
      {keywords}
      <DISS_language>en</DISS_language>
    </DISS_categorization>
  </DISS_description>
  <DISS_content>
    {binary}
  </DISS_content>
  {license}
</DISS_submission>
"#,
        surname = fixture.surname,
        fname = fixture.fname,
        middle = fixture.middle,
        title = fixture.title,
    )
}

/// Write a package directory `<root>/<name>` with `<stem>_DATA.xml`,
/// `<stem>.pdf`, and an `attachments/` directory holding `attachments`.
#[allow(dead_code)]
pub fn write_package(
    root: &Path,
    name: &str,
    stem: &str,
    fixture: &ExportFixture<'_>,
    attachments: &[&str],
) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create package dir");
    fs::write(dir.join(format!("{stem}_DATA.xml")), export_xml(fixture)).expect("write export");
    fs::write(dir.join(format!("{stem}.pdf")), format!("%PDF {stem}")).expect("write pdf");
    if !attachments.is_empty() {
        let att = dir.join("attachments");
        fs::create_dir(&att).expect("create attachments");
        for file in attachments {
            fs::write(att.join(file), file.as_bytes()).expect("write attachment");
        }
    }
    dir
}

/// Names of the entries of a directory, sorted.
#[allow(dead_code)]
pub fn entry_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
