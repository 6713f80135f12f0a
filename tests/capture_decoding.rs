//! End-to-end decoding of captured link traffic through the public API.

use anyhow::{Context, Result, ensure};
use heatlink::{
    AttributedDiagnostic, BinarySource, DecoderConfig, Diagnostic, Dictionary, HeatLink,
    InputFormat, Outcome,
};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn link(config: DecoderConfig) -> Result<HeatLink> {
    HeatLink::load(fixture("object-dictionary.json"), config).context("Loading object dictionary")
}

#[test]
fn single_request_frame_is_not_decoded() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let link = link(DecoderConfig::default())?;
    let stream: &[u8] = &[0x01, 0x00, 0x00, 0x00, 0x05, 0xAA, 0xBB, 0xCC, 0x30, 0x23, 0x00, 0x01, 0x02];

    let mut diagnostics: Vec<AttributedDiagnostic> = Vec::new();
    let mut session = link.session(BinarySource::new(stream));
    let record = session.next_record(&mut diagnostics)?.context("Expected one record")?;

    assert_eq!(record.message.datapoint_id.to_string(), "3023");
    assert_eq!(record.message.subindex, 0);
    assert!(!record.message.is_reply());
    assert_eq!(record.outcome, Outcome::Request);
    ensure!(session.next_record(&mut diagnostics)?.is_none(), "Expected exactly one frame");
    assert_eq!(session.summary().frames, 1);
    Ok(())
}

#[test]
fn hex_capture_end_to_end() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let config = DecoderConfig { input: InputFormat::Hex, ..DecoderConfig::default() };
    let link = link(config)?;

    let mut report: Vec<u8> = Vec::new();
    let mut diagnostics: Vec<AttributedDiagnostic> = Vec::new();
    let summary = link
        .open(fixture("capture.hex"))
        .context("Opening hex capture")?
        .run(&mut report, &mut diagnostics)?;
    let report = String::from_utf8(report)?;

    assert_eq!(summary.frames, 10);
    assert_eq!(summary.requests, 5);
    assert_eq!(summary.replies, 5);
    assert_eq!(summary.decoded, 4);
    assert_eq!(summary.unknown, 1);
    assert_eq!(summary.checksum_mismatches, 0);
    assert_eq!(summary.ordering_anomalies, 0);
    assert_eq!(summary.spurious_bytes, 2);
    assert!(!summary.truncated);

    assert!(report.contains("OBJ[3023][U16] \"Flow temperature\" value=22.1 unit=°C"));
    assert!(report.contains("OBJ[2001][Enum] \"Burner state\" value=on"));
    assert!(report.contains("value=441763200 (1984-01-01T00:00:00+00:00)"));
    assert!(report.contains("OBJ[5001][VisibleString] \"Device name\" value=\"BOILER\""));
    ensure!(!report.contains("SPURIOUS"), "Diagnostics must not leak into the report");

    assert_eq!(
        diagnostics.first(),
        Some(&AttributedDiagnostic { frame: None, diagnostic: Diagnostic::SpuriousBytes(vec![0xFF, 0xFF]) })
    );
    assert_eq!(diagnostics.last().map(|d| d.diagnostic.to_string()).as_deref(), Some("UNKNOWN OBJECT 9999 data=ab"));
    assert_eq!(diagnostics.len(), 2);
    Ok(())
}

#[test]
fn binary_and_hex_inputs_agree() -> Result<()> {
    let text = std::fs::read_to_string(fixture("capture.hex"))?;
    let bytes = hex::decode(text.split_whitespace().collect::<String>())?;
    let link = link(DecoderConfig::default())?;

    let mut from_binary: Vec<u8> = Vec::new();
    let mut from_hex: Vec<u8> = Vec::new();
    let mut sink: Vec<AttributedDiagnostic> = Vec::new();

    link.session(BinarySource::new(bytes.as_slice())).run(&mut from_binary, &mut sink)?;
    link.session(InputFormat::Hex.open(std::io::Cursor::new(text))).run(&mut from_hex, &mut sink)?;

    assert_eq!(from_binary, from_hex);
    Ok(())
}

#[test]
fn truncated_capture_keeps_earlier_output() -> Result<()> {
    let text = std::fs::read_to_string(fixture("capture.hex"))?;
    let mut bytes = hex::decode(text.split_whitespace().collect::<String>())?;
    bytes.truncate(bytes.len() - 3);
    let link = link(DecoderConfig::default())?;

    let mut report: Vec<u8> = Vec::new();
    let mut diagnostics: Vec<AttributedDiagnostic> = Vec::new();
    let summary = link.session(BinarySource::new(bytes.as_slice())).run(&mut report, &mut diagnostics)?;

    assert!(summary.truncated);
    assert_eq!(summary.frames, 9);
    assert!(String::from_utf8(report)?.contains("value=\"BOILER\""));
    assert!(matches!(
        diagnostics.last().map(|d| &d.diagnostic),
        Some(Diagnostic::IncompleteFrame { .. })
    ));
    Ok(())
}

#[test]
fn invalid_dictionary_is_fatal() {
    let err = Dictionary::parse(r#"{"3023": {"type": "U16", "desc": "x", "is_array": false, "values": {}}}"#, true)
        .expect_err("values on a non-Enum entry");
    let err: heatlink::LinkError = err.into();
    assert!(err.is_fatal());

    assert!(HeatLink::load(fixture("missing.json"), DecoderConfig::default()).is_err());
}
