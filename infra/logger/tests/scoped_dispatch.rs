use dh_logger::{ConsoleTarget, Logger};

#[test]
fn building_loggers_leaves_the_global_subscriber_alone() {
    let first = Logger::builder()
        .name("integration-scoped-first")
        .console(ConsoleTarget::Stderr)
        .build()
        .expect("first logger should build");

    let second = Logger::builder()
        .name("integration-scoped-second")
        .console(ConsoleTarget::Stderr)
        .build()
        .expect("second logger should build");

    first.warn("first");
    second.warn("second");

    let noop = tracing::Dispatch::new(tracing::subscriber::NoSubscriber::default());
    assert!(
        tracing::dispatcher::set_global_default(noop).is_ok(),
        "a scoped logger must not install itself globally"
    );
}
