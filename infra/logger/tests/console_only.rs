use dh_logger::{ConsoleTarget, LevelFilter, Logger};

#[test]
fn console_only_has_no_guard() {
    let logger = Logger::builder()
        .name("integration-console-only")
        .console(ConsoleTarget::Stderr)
        .level(LevelFilter::INFO)
        .build()
        .expect("logger should build");

    assert!(logger.guard().is_none(), "console-only logger should not create a file guard");
    assert_eq!(logger.name(), "integration-console-only");
}

#[test]
fn stdout_logger_is_ready_to_use() {
    let logger = Logger::stdout();

    assert!(logger.guard().is_none());
    assert_eq!(logger.name(), "deprecation");
    logger.warn("integration warning on stdout");
}
