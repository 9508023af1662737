/// Initialize env_logger once. Idempotent: subsequent calls are no-ops.
///
/// Logs go to stderr so stdout carries only the command's output.
/// `RUST_LOG` wins over `verbose` when set.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "cmdlog=debug" } else { "cmdlog=info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .format_module_path(false)
        .target(env_logger::Target::Stderr)
        .try_init();
}
