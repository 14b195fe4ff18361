use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_etiquetas-pdf"));
    // never launch a viewer from tests
    cmd.arg("--no-open");
    cmd
}

fn image_xobject_count(path: &Path) -> usize {
    let bytes = fs::read(path).expect("Failed to read PDF");
    let needle = b"/Subtype/Image";
    bytes.windows(needle.len()).filter(|w| w == needle).count()
}

fn output_dir(name: &str) -> PathBuf {
    let dir = Path::new("tests/output").join(name);
    fs::create_dir_all(&dir).expect("Failed to create output directory");
    let sheet = dir.join("etiquetas.pdf");
    if sheet.exists() {
        fs::remove_file(&sheet).ok();
    }
    dir
}

fn assert_pdf(path: &Path) {
    assert!(path.exists(), "PDF file was not created: {}", path.display());
    let bytes = fs::read(path).expect("Failed to read PDF");
    assert!(bytes.starts_with(b"%PDF"), "Output is not a PDF");
    assert!(bytes.len() > 1000, "PDF file is too small, likely empty or corrupt");
}

#[test]
fn test_single_group_sheet() {
    let dir = output_dir("single-group");

    let output = cargo_bin()
        .args([
            "-n", "3",
            "-c", "MAN",
            "-p", "A 960 505 49 55",
            "-d", "01/01/2025",
            "-t", "10:00:00",
            "--code", "US873001",
            "--clients", "tests/output/no-clients.json",
            "-o", dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&dir.join("etiquetas.pdf"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Labels: 5"), "Unexpected summary: {}", stdout);
    assert!(stdout.contains("Pages: 1"), "Unexpected summary: {}", stdout);
}

#[test]
fn test_two_groups_overflow_to_second_page() {
    let dir = output_dir("two-groups");

    let output = cargo_bin()
        .args([
            "-n", "16",
            "--groups",
            "--group1-count", "9",
            "-c", "DAF Trucks",
            "-d", "15/03/2025",
            "-t", "08:30:00",
            "--client2", "IVECO",
            "--date2", "16/03/2025",
            "--time2", "09:45:10",
            "-o", dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&dir.join("etiquetas.pdf"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pages: 2"), "Unexpected summary: {}", stdout);
    assert!(stdout.contains("Groups: 9 / 7"), "Unexpected summary: {}", stdout);
}

#[test]
fn test_with_logo_mapping() {
    let dir = output_dir("with-logo");

    let logo = dir.join("man.png");
    let mut img = image::RgbaImage::new(64, 32);
    for (x, _, px) in img.enumerate_pixels_mut() {
        *px = if x % 8 < 4 {
            image::Rgba([0, 60, 140, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        };
    }
    img.save(&logo).expect("Failed to write logo");

    let clients = dir.join("clients.json");
    fs::write(&clients, r#"{"MAN": "man.png", "BROKEN": "missing.png"}"#)
        .expect("Failed to write client mapping");

    let output = cargo_bin()
        .args([
            "-n", "5",
            "-c", "MAN",
            "--groups",
            "--group1-count", "2",
            "--client2", "BROKEN",
            "--clients", clients.to_str().unwrap(),
            "-o", dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    // an unreadable logo only drops the logo
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&dir.join("etiquetas.pdf"));

    // same sheet with no mapped logo at all: barcodes only
    let plain_dir = output_dir("with-logo-plain");
    let plain = cargo_bin()
        .args([
            "-n", "5",
            "-c", "NOLOGO",
            "--groups",
            "--group1-count", "2",
            "--client2", "BROKEN",
            "--clients", clients.to_str().unwrap(),
            "-o", plain_dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");
    assert!(plain.status.success(), "Command failed: {:?}", plain);

    let barcodes_only = image_xobject_count(&plain_dir.join("etiquetas.pdf"));
    let with_logo = image_xobject_count(&dir.join("etiquetas.pdf"));
    // one barcode per label (5 vertical + 2 horizontal)
    assert_eq!(barcodes_only, 7);
    // group 1 has 2 vertical labels and the left horizontal label
    assert_eq!(with_logo, barcodes_only + 3);
}

#[test]
fn test_preview() {
    let dir = output_dir("preview");

    let output = cargo_bin()
        .args(["--preview", "-c", "MAN", "-o", dir.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&dir.join("etiquetas-preview.pdf"));
    assert!(!dir.join("etiquetas.pdf").exists());
}

#[test]
fn test_invalid_date_format() {
    let dir = output_dir("invalid-date");

    let output = cargo_bin()
        .args(["-d", "31/02/2025", "-o", dir.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should have failed for invalid date");
    assert!(!dir.join("etiquetas.pdf").exists());
}

#[test]
fn test_invalid_time_format() {
    let dir = output_dir("invalid-time");

    let output = cargo_bin()
        .args(["-t", "25:61:00", "-o", dir.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should have failed for invalid time");
    assert!(!dir.join("etiquetas.pdf").exists());
}

#[test]
fn test_invalid_group_split() {
    let dir = output_dir("invalid-groups");

    let output = cargo_bin()
        .args(["-n", "4", "--groups", "--group1-count", "4", "-o", dir.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should have failed for group1 >= total");
    assert!(!dir.join("etiquetas.pdf").exists());
}

#[test]
fn test_unencodable_barcode() {
    let dir = output_dir("bad-barcode");

    let output = cargo_bin()
        .args(["--code", "CÓDIGO", "-o", dir.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should have failed for non-Code128 value");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("barcode"), "Unexpected error: {}", stderr);
}

#[test]
fn test_missing_spreadsheet() {
    let dir = output_dir("missing-excel");

    let output = cargo_bin()
        .args(["--excel", "nonexistent.xlsx", "-o", dir.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should have failed for missing spreadsheet");
}
