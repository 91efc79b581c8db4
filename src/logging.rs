use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI用のログ初期化（`RUST_LOG` があればそちらを優先）
pub fn init_cli_logger(verbose: bool) {
    let default_filter = if verbose {
        "puantaj_rust=debug,puantaj_common=debug"
    } else {
        "puantaj_rust=info,puantaj_common=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 二重初期化（テストなど）は無視する
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();
}
