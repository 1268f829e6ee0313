pub mod codec;
pub mod color;
pub mod config;
pub mod converter;
pub mod error;
pub mod format;
pub mod masker;
pub mod presenter;
pub mod preview;
pub mod session;

pub use color::ColorSample;
pub use config::AppConfig;
pub use converter::{convert_image, ConversionRequest, ConversionResult, ConverterSettings};
pub use error::{PicError, Result};
pub use format::TargetFormat;
pub use masker::{remove_color, TransparencyRequest, TransparencyResult, TransparencySettings, DEFAULT_TOLERANCE};
pub use presenter::Presenter;
pub use preview::{Preview, PreviewGeometry, PreviewSettings};
pub use session::Session;

/// Initializes the logger.
///
/// Lines look like `[12:34:56 INFO converter.rs 98] message`. Defaults to
/// `info`; `RUST_LOG` overrides the filter.
pub fn init_logger() {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}
