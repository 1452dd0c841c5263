use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

/// Used when neither `BLOCKBOX_LOG` nor `RUST_LOG` is set. Lock changes and
/// edits come from the controller at debug; wgpu internals stay quiet.
const DEFAULT_DIRECTIVES: &str = "info,blockbox::controller=debug,wgpu_core=warn,wgpu_hal=warn,naga=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("BLOCKBOX_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init() {
            // performance marks per event would flood the devtools timeline
            let config = tracing_wasm::WASMLayerConfigBuilder::new()
                .set_report_logs_in_timings(false)
                .build();

            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_wasm::WASMLayer::new(config))
                .try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use std::ffi::OsString;
        use std::io;
        use std::path::{Path, PathBuf};

        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        const DEFAULT_LOG_FILE: &str = "logs/blockbox.log";

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Directory and file prefix for the daily rolling log.
        fn log_file_target(raw: &str) -> (PathBuf, OsString) {
            let path = Path::new(raw);
            let dir = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let file = path
                .file_name()
                .map(|f| f.to_os_string())
                .unwrap_or_else(|| OsString::from("blockbox.log"));
            (dir, file)
        }

        fn panic_message(payload: &(dyn std::any::Any + Send), location: Option<&std::panic::Location<'_>>) -> String {
            let payload = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("<non-string panic>");
            match location {
                Some(loc) => format!("panic at {}:{}:{} {payload}", loc.file(), loc.line(), loc.column()),
                None => format!("panic {payload}"),
            }
        }

        /// stderr gets a short line per event; the file keeps source locations.
        pub fn init() {
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .compact();

            let raw_path = std::env::var("BLOCKBOX_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            let (dir, file) = log_file_target(&raw_path);
            let (nb_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, &file));
            let _ = FILE_GUARD.set(guard);

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true);

            let installed = tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_ok();

            if installed {
                tracing::info!("logging to {}", dir.join(&file).display());
            }

            std::panic::set_hook(Box::new(|info| {
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!(target: "blockbox::panic", "{}\nBacktrace:\n{bt}", panic_message(info.payload(), info.location()));
            }));
        }

        #[cfg(test)]
        mod tests {
            use super::*;

            #[test]
            fn test_log_file_target_splits_dir_and_prefix() {
                assert_eq!(
                    log_file_target("logs/run.log"),
                    (PathBuf::from("logs"), OsString::from("run.log"))
                );
                assert_eq!(log_file_target("run.log"), (PathBuf::from("."), OsString::from("run.log")));
                assert_eq!(log_file_target("/"), (PathBuf::from("."), OsString::from("blockbox.log")));
            }

            #[test]
            fn test_panic_message_reads_payload() {
                let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("boom"));
                assert_eq!(panic_message(&*owned, None), "panic boom");
                let unknown: Box<dyn std::any::Any + Send> = Box::new(7u8);
                assert_eq!(panic_message(&*unknown, None), "panic <non-string panic>");
            }

            #[test]
            fn test_default_directives_parse() {
                assert!(EnvFilter::try_new(DEFAULT_DIRECTIVES).is_ok());
            }
        }
    }
}
