use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_catalog() -> NamedTempFile {
    let mut catalog = NamedTempFile::new().unwrap();
    writeln!(
        catalog,
        r#"[
  {{"id": "00000000-0000-0000-0000-000000000001", "name": "landing", "base_price_clp": "14990"}},
  {{"id": "00000000-0000-0000-0000-000000000002", "name": "starter", "base_price_clp": "0"}}
]"#
    )
    .unwrap();
    catalog
}

#[test]
fn test_free_intent_end_to_end() {
    let catalog = write_catalog();
    let mut events = NamedTempFile::new().unwrap();
    writeln!(
        events,
        r#"{{"op":"intent","template_id":"00000000-0000-0000-0000-000000000002","provider":"mercadopago","buyer_email":"buyer@example.com"}}"#
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("storefront-payments"));
    cmd.arg(events.path()).arg("--catalog").arg(catalog.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"approved\""))
        .stdout(predicate::str::contains("\"payment_id\":\"free_"));
}

#[test]
fn test_paid_intent_stays_pending_without_webhook() {
    let catalog = write_catalog();
    let mut events = NamedTempFile::new().unwrap();
    writeln!(
        events,
        r#"{{"op":"intent","template_id":"00000000-0000-0000-0000-000000000001","provider":"stripe"}}"#
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("storefront-payments"));
    cmd.arg(events.path()).arg("--catalog").arg(catalog.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"pending\""))
        .stdout(predicate::str::contains("\"payment_id\":\"st_"));
}

#[test]
fn test_bad_event_lines_are_skipped_not_fatal() {
    let catalog = write_catalog();
    let mut events = NamedTempFile::new().unwrap();
    writeln!(events, "not json at all").unwrap();
    writeln!(
        events,
        r#"{{"op":"intent","template_id":"00000000-0000-0000-0000-000000000002"}}"#
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("storefront-payments"));
    cmd.arg(events.path()).arg("--catalog").arg(catalog.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"approved\""))
        .stderr(predicate::str::contains("Error reading event"));
}
