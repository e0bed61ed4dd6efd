#[cfg(not(target_arch = "wasm32"))]
use log::LevelFilter;

/// Install the logger that the solver, lexicon and snapshot code report through.
///
/// The `muddle` binary calls this with `MUDDLE_DEBUG` set or unset; in the browser,
/// `wasm::initialize` calls it after installing the panic hook.
///
/// - **Native:** stderr via `env_logger`. `Debug` when `debug_enabled`, which adds the
///   per-solve branch counts; otherwise `Info`. `RUST_LOG` overrides both.
/// - **WASM:** browser console via `console_log`, same levels.
///
/// A second call keeps the first logger, so tests and repeated `initialize` calls are fine.
pub fn init_logger(debug_enabled: bool) {
    #[cfg(target_arch = "wasm32")]
    {
        let level = if debug_enabled {
            log::Level::Debug
        } else {
            log::Level::Info
        };

        match console_log::init_with_level(level) {
            Ok(()) => {
                log::info!("muddle console logger initialized at {level:?} level");
            }
            Err(e) => {
                // keep running without logs rather than failing the module
                let msg = format!("muddle: console_log setup failed ({e}); solving continues without logs");
                web_sys::console::error_1(&msg.into());
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let level = if debug_enabled {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };

        let mut builder = env_logger::Builder::new();
        builder
            .filter(None, level)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false);

        // Let RUST_LOG override our defaults if explicitly set
        if let Ok(spec) = std::env::var("RUST_LOG") {
            builder.parse_filters(&spec);
        }

        if builder.try_init().is_ok() {
            log::debug!("muddle stderr logger initialized at {level:?} level");
        }
    }
}
