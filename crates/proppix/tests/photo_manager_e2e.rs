use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PROPERTY: &str = "6f1c2a4e-8d3b-4c55-9a7e-2b1d0c9e8f10";

fn proppix(data: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("proppix"));
    cmd.env("PROPPIX_DATA", data.as_os_str())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("PROPPIX_BUCKET")
        .env_remove("PROPPIX_PUBLIC_BASE_URL")
        .env_remove("PROPPIX_MAX_FILE_SIZE")
        .env_remove("PROPPIX_ACCEPTED_MIME_PREFIX");
    cmd
}

fn listed_names(data: &Path) -> Vec<String> {
    let output = proppix(data).args(["list", PROPERTY]).output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .filter(|line| line.contains(". "))
        .map(|line| line.split(". ").nth(1).unwrap().split("  ").next().unwrap().to_string())
        .collect()
}

#[test]
fn test_photo_manager_workflow() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let inbox = temp.path().join("inbox");
    fs::create_dir_all(&inbox).unwrap();
    for name in ["front.jpg", "garden.png", "kitchen.jpg"] {
        fs::write(inbox.join(name), name.as_bytes()).unwrap();
    }

    // 1. Empty property
    proppix(&data)
        .args(["list", PROPERTY])
        .assert()
        .success()
        .stdout(predicate::str::contains("No photos"));

    // 2. Upload three photos
    proppix(&data)
        .args(["add", PROPERTY])
        .arg(inbox.join("front.jpg"))
        .arg(inbox.join("garden.png"))
        .arg(inbox.join("kitchen.jpg"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded 3 photos"));
    assert_eq!(listed_names(&data), vec!["front.jpg", "garden.png", "kitchen.jpg"]);
    assert!(data.join("photos.json").exists());
    assert!(data.join("pics").join(PROPERTY).is_dir());

    // 3. Promote the kitchen
    proppix(&data)
        .args(["promote", PROPERTY, "3"])
        .assert()
        .success();
    assert_eq!(listed_names(&data), vec!["kitchen.jpg", "front.jpg", "garden.png"]);

    // 4. Move the garden up
    proppix(&data)
        .args(["move", PROPERTY, "3", "up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reordered 2 photos"));
    assert_eq!(listed_names(&data), vec!["kitchen.jpg", "garden.png", "front.jpg"]);

    // 5. Remove the primary photo; the next one takes its place
    proppix(&data)
        .args(["remove", PROPERTY, "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 photo"));
    assert_eq!(listed_names(&data), vec!["garden.png", "front.jpg"]);
    proppix(&data)
        .args(["list", PROPERTY])
        .assert()
        .success()
        .stdout(predicate::str::contains("★  1. garden.png"));

    let blobs = fs::read_dir(data.join("pics").join(PROPERTY)).unwrap().count();
    assert_eq!(blobs, 2);
}

#[test]
fn test_rejects_non_image_upload() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let plan = temp.path().join("plan.pdf");
    fs::write(&plan, b"%PDF").unwrap();

    proppix(&data)
        .args(["add", PROPERTY])
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an accepted file type"));
    assert!(!data.join("photos.json").exists());
}

#[test]
fn test_out_of_range_position_fails() {
    let temp = TempDir::new().unwrap();
    proppix(temp.path())
        .args(["promote", PROPERTY, "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No photo at position 4"));

    proppix(temp.path())
        .args(["remove", PROPERTY, "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positions start at 1"));
}

#[test]
fn test_respects_config_file_bucket() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("proppix.toml"), "bucket = \"listing-photos\"\n").unwrap();
    let photo = temp.path().join("front.jpg");
    fs::write(&photo, b"jpg").unwrap();

    proppix(temp.path())
        .args(["add", PROPERTY])
        .arg(&photo)
        .assert()
        .success();
    assert!(temp.path().join("listing-photos").join(PROPERTY).is_dir());
}

#[test]
fn test_environment_overrides_config_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("proppix.toml"), "bucket = \"listing-photos\"\n").unwrap();
    let photo = temp.path().join("front.jpg");
    fs::write(&photo, b"jpg").unwrap();

    proppix(temp.path())
        .env("PROPPIX_BUCKET", "env-photos")
        .env("PROPPIX_PUBLIC_BASE_URL", "https://cdn.example/photos")
        .args(["add", PROPERTY])
        .arg(&photo)
        .assert()
        .success();
    assert!(temp.path().join("env-photos").join(PROPERTY).is_dir());
    assert!(!temp.path().join("listing-photos").exists());

    proppix(temp.path())
        .env("PROPPIX_BUCKET", "env-photos")
        .env("PROPPIX_PUBLIC_BASE_URL", "https://cdn.example/photos")
        .args(["list", PROPERTY])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "https://cdn.example/photos/{}/",
            PROPERTY
        )));
}

#[test]
fn test_environment_tightens_upload_limit() {
    let temp = TempDir::new().unwrap();
    let photo = temp.path().join("front.jpg");
    fs::write(&photo, b"0123456789").unwrap();

    proppix(temp.path())
        .env("PROPPIX_MAX_FILE_SIZE", "4")
        .args(["add", PROPERTY])
        .arg(&photo)
        .assert()
        .failure()
        .stderr(predicate::str::contains("the limit is 4 bytes"));
}
