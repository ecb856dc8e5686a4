//!
//! Connector framework contract
//!
//! Provides the resource/entitlement/grant model that identity-sync
//! connectors produce, the traits they implement, and the shared
//! configuration and logging utilities.
#![deny(missing_docs)]

pub use config::fetch_credentials;
pub use connectors::Connector;

pub mod config;
pub mod connectors;
pub mod logging;

#[macro_export]
/// Time the code inside the macro. Write the elapsed time to debug logs.
/// Derived from https://notes.iveselov.info/programming/time_it-a-case-study-in-rust-macros
macro_rules! log_runtime {
    ($context:expr, $($tt:tt)+) => {
        {
            $crate::logging::debug!("{}: starting", $context);
            let timer = std::time::Instant::now();
            let x =
            $(
                $tt
            )+;
            $crate::logging::debug!("{}: {:?}", $context, timer.elapsed());
            x
        }
    }
}
