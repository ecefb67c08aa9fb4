use std::fs::File;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

pub const DEBUG_BIT: u8 = 0b0001;
pub const INFO_BIT: u8 = 0b0010;
pub const ERROR_BIT: u8 = 0b0100;
pub const FATAL_BIT: u8 = 0b1000;

/// `--log-mask`'s four channels aren't nested severities the way
/// `tracing::Level` is — mask `0b1010` enables info and fatal but not
/// debug or plain error, which a single `LevelFilter` can't express.
/// "Fatal" has no `Level` counterpart; it's an `error!` event carrying
/// `fatal = true`, detected here from the event's declared field names
/// rather than its recorded values.
macro_rules! fatal {
    ($($arg:tt)*) => {
        tracing::error!(fatal = true, $($arg)*)
    };
}
pub(crate) use fatal;

/// One of the four independent log channels named by `--log-mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Debug,
    Info,
    Error,
    Fatal,
}

impl Channel {
    fn bit(self) -> u8 {
        match self {
            Self::Debug => DEBUG_BIT,
            Self::Info => INFO_BIT,
            Self::Error => ERROR_BIT,
            Self::Fatal => FATAL_BIT,
        }
    }

    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        let has_fatal_field = metadata.fields().field("fatal").is_some();
        match *metadata.level() {
            Level::TRACE | Level::DEBUG => Self::Debug,
            Level::INFO | Level::WARN => Self::Info,
            Level::ERROR if has_fatal_field => Self::Fatal,
            Level::ERROR => Self::Error,
        }
    }
}

fn mask_allows(mask: u8, metadata: &tracing::Metadata<'_>) -> bool {
    mask & Channel::of(metadata).bit() != 0
}

/// Wires up `tracing` + `tracing-subscriber` the way `donos::init_logs`
/// does (`registry().with(...).with(fmt::layer()...)`), but driven by
/// `--log`/`--log-mask` instead of `RUST_LOG`.
pub fn init(log_path: Option<&Path>, mask: u8) -> std::io::Result<()> {
    let ansi = log_path.is_none() && cfg!(debug_assertions);
    let writer = match log_path {
        Some(path) => BoxMakeWriter::new(File::create(path)?),
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let filter = FilterFn::new(move |metadata| mask_allows(mask, metadata));

    let _ = registry()
    .with(
        fmt::layer()
        .with_ansi(ansi)
        .with_writer(writer)
        .with_filter(filter),
    )
    .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_channel_is_gated_by_its_own_bit_only() {
        for channel in [Channel::Debug, Channel::Info, Channel::Error, Channel::Fatal] {
            assert!(channel.bit() & channel.bit() != 0);
            for other in [Channel::Debug, Channel::Info, Channel::Error, Channel::Fatal] {
                if other != channel {
                    assert_eq!(channel.bit() & other.bit(), 0);
                }
            }
        }
    }

    #[test]
    fn mask_0b1010_enables_info_and_fatal_only() {
        let mask = INFO_BIT | FATAL_BIT;
        assert_eq!(mask & Channel::Debug.bit(), 0);
        assert_ne!(mask & Channel::Info.bit(), 0);
        assert_eq!(mask & Channel::Error.bit(), 0);
        assert_ne!(mask & Channel::Fatal.bit(), 0);
    }

    #[test]
    fn full_mask_is_all_four_bits() {
        let full = DEBUG_BIT | INFO_BIT | ERROR_BIT | FATAL_BIT;
        assert_eq!(full, 0b1111);
    }
}
