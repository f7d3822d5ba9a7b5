//! Integration tests for PIN table loading using the bundled sample table.

use enroll_core::validation::{AddressForm, StepInput};
use enroll_core::{EnrollmentFlow, EnrollmentStore, StepId};
use enroll_core::store::MemorySlot;
use enroll_data::{PinTableError, PinTableLoader};
use pretty_assertions::assert_eq;
use std::io::Write;

const TEST_CSV: &str = include_str!("../test-data/pins.csv");

#[test]
fn test_sample_table_parses_every_row() {
    let records = PinTableLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

    assert_eq!(records.len(), 10);
    assert!(records.iter().any(|r| r.city == "Chennai"));
}

#[test]
fn test_sample_table_builds_directory() {
    let records = PinTableLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    let directory = PinTableLoader::into_directory(records);

    let pune = directory.lookup("411001").expect("Pune should be present");
    assert_eq!(pune.city, "Pune");
    assert_eq!(pune.state, "Maharashtra");
    assert_eq!(directory.lookup("999999"), None);
}

#[test]
fn test_load_from_file_reports_bad_row() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "pin_code,city,state").unwrap();
    writeln!(file, "110001,New Delhi,Delhi").unwrap();
    writeln!(file, "400001,Mumbai,Maharashtra").unwrap();
    writeln!(file, "5600,Bangalore,Karnataka").unwrap();

    let err = PinTableLoader::load_from_file(file.path()).unwrap_err();

    assert!(matches!(err, PinTableError::InvalidPin { row: 3, .. }));
    assert!(err.to_string().starts_with("Row 3:"));
}

#[tokio::test]
async fn test_loaded_table_drives_address_autofill() {
    let directory =
        PinTableLoader::into_directory(PinTableLoader::parse(TEST_CSV.as_bytes()).unwrap());
    let store = EnrollmentStore::open(Box::new(MemorySlot::new())).await.unwrap();
    let flow = EnrollmentFlow::new(store).with_pin_directory(directory);

    let Some(StepInput::Address(mut form)) = flow.draft_for(StepId::Address) else {
        panic!("address draft expected");
    };
    let hit = form.set_pin_code("600001", flow.pins());

    assert!(hit);
    assert_eq!(form.city, "Chennai");
    assert_eq!(form.state, "Tamil Nadu");
    assert_eq!(AddressForm::from_answer(flow.state()).city, "");
}
