//! Log shims compiled out without the `tracing` feature.

macro_rules! debug_event {
    ($($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)+);
        }
    }};
}

macro_rules! warn_event {
    ($($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::warn!($($arg)+);
        }
    }};
}

pub(crate) use debug_event;
pub(crate) use warn_event;
