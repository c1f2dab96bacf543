use dh_logger::{ConsoleTarget, LevelFilter, Logger, Rotation};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_logging_writes_warnings() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("integration-file-logging")
        .console(ConsoleTarget::Off)
        .env_filter("info")
        .path(&log_dir)
        .rotation(Rotation::NEVER)
        .level(LevelFilter::INFO)
        .build()?;

    logger.warn_with_backtrace("old_api is deprecated", &["frame0", "frame1"]);

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    assert!(contents.contains("old_api is deprecated"), "unexpected log contents: {contents}");
    assert!(contents.contains("frame1"));

    Ok(())
}

#[test]
fn clones_share_the_file_guard() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;

    let logger = Logger::builder()
        .name("integration-shared-guard")
        .console(ConsoleTarget::Off)
        .path(tmp_dir.path())
        .build()?;
    let clone = logger.clone();
    drop(logger);

    assert!(clone.guard().is_some(), "guard must outlive the original handle");
    clone.warn("still writable");

    Ok(())
}
