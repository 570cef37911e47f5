/*!
 * Tests for XMLTV reading and writing
 */

use epgmerge::epg::xmltv::{parse_document, write_document};
use epgmerge::epg::{Channel, Programme};

use crate::common::sample_xmltv;

#[test]
fn test_parseDocument_withSampleGuide_shouldKeepNestedDetails() {
    let doc = parse_document("sample", sample_xmltv().as_bytes()).unwrap();

    assert_eq!(doc.channels.len(), 2);
    assert_eq!(doc.programmes.len(), 3);

    let midday = &doc.programmes[0];
    assert_eq!(midday.attribute("channel"), Some("news.uk"));
    assert_eq!(midday.child("desc").unwrap().text(), "Headlines & weather.");
    assert_eq!(midday.child("category").unwrap().attribute("lang"), Some("en"));
}

#[test]
fn test_parseDocument_withHtmlEntity_shouldDecodeIt() {
    let xml = r#"<tv><channel id="a"><display-name>Sky&nbsp;One</display-name></channel></tv>"#;
    let doc = parse_document("entities", xml.as_bytes()).unwrap();

    assert_eq!(doc.channels[0].child("display-name").unwrap().text(), "Sky\u{a0}One");
}

#[test]
fn test_parseDocument_withUnknownEntity_shouldKeepThatEntityOnly() {
    let xml = r#"<tv><channel id="a"><display-name>Sky &amp; &madeup; One</display-name></channel></tv>"#;
    let doc = parse_document("entities", xml.as_bytes()).unwrap();

    assert_eq!(doc.channels[0].child("display-name").unwrap().text(), "Sky & &madeup; One");
}

#[test]
fn test_parseDocument_shouldOnlyRouteDirectRootChildren() {
    let xml = r#"<tv>
        <channel id="a"><display-name>A</display-name></channel>
        <extra><channel id="nested" /></extra>
    </tv>"#;
    let doc = parse_document("nested", xml.as_bytes()).unwrap();

    assert_eq!(doc.channels.len(), 1);
    assert_eq!(doc.channels[0].attribute("id"), Some("a"));
}

#[test]
fn test_parseDocument_withSecondRoot_shouldFail() {
    let err = parse_document("twice", b"<tv></tv><tv></tv>").unwrap_err();
    assert_eq!(err.kind(), "SourceParseError");
    assert!(err.to_string().contains("twice"));
}

#[test]
fn test_parseDocument_withMismatchedTags_shouldFail() {
    assert!(parse_document("bad", b"<tv><channel id=\"a\"></programme></tv>").is_err());
}

#[test]
fn test_writeDocument_withEmptyGuide_shouldWriteBareRoot() {
    let xml = write_document(&[], &[], "");
    assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<tv>\n</tv>\n");
}

#[test]
fn test_writeDocument_shouldWriteChannelsBeforeProgrammes() {
    let channels = vec![Channel::new("ch1", "One")];
    let programmes = vec![Programme::new("ch1", "20250101120000 +0000", "20250101130000 +0000", "Noon")
        .with_desc("Quotes \"here\"")];

    let xml = write_document(&channels, &programmes, "epgmerge");

    let channel_at = xml.find("<channel").unwrap();
    let programme_at = xml.find("<programme").unwrap();
    assert!(channel_at < programme_at);
    assert!(xml.contains(
        "<programme start=\"20250101120000 +0000\" stop=\"20250101130000 +0000\" channel=\"ch1\">"
    ));
    assert!(xml.contains("<desc>Quotes &quot;here&quot;</desc>"));
}
