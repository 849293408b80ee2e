use std::panic::PanicHookInfo;

/// Installs a panic hook that routes panic messages through `tracing` so they
/// end up in the same format (and the same sink) as regular log events.
pub fn install() {
    std::panic::set_hook(Box::new(tracing_panic_hook));
}

/// Panic hook that prints roughly the same message as the default panic hook
/// but uses tracing:error instead of stderr.
fn tracing_panic_hook(panic: &PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}
