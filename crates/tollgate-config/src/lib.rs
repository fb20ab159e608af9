//! # Tollgate Config
//!
//! Loads the data options of a tollgate [`Gate`](tollgate::Gate) from files
//! and environment variables.
//!
//! ## Layers
//!
//! 1. Defaults ([`GateOptions::default`])
//! 2. A TOML or JSON file
//! 3. Environment variables `PREFIX__KEY`, optionally seeded from `.env`
//!
//! ## Environment variables
//!
//! | Variable             | Option      | Format                    |
//! |----------------------|-------------|---------------------------|
//! | `PREFIX__SECRET`     | `secret`    | string                    |
//! | `PREFIX__TTL`        | `ttl`       | seconds, or `none`        |
//! | `PREFIX__SECURE`     | `secure`    | boolean                   |
//! | `PREFIX__RELAXED`    | `relaxed`   | comma-separated hosts     |
//! | `PREFIX__HEADER`     | `header`    | header name               |
//! | `PREFIX__REGEXP`     | `regexp`    | pattern, one group        |
//! | `PREFIX__COOKIE`     | `cookie`    | cookie name               |
//! | `PREFIX__ATTRIBUTE`  | `attribute` | name, empty disables      |
//! | `PREFIX__PATH`       | `path`      | comma-separated prefixes  |
//! | `PREFIX__IGNORE`     | `ignore`    | comma-separated prefixes  |
//!
//! ## Example
//!
//! ```no_run
//! use tollgate_config::OptionsLoader;
//!
//! # fn main() -> Result<(), tollgate_config::ConfigError> {
//! let config = OptionsLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("tollgate.toml")?
//!     .with_env_prefix("TOLLGATE")
//!     .load()?
//!     .into_builder()?
//!     .error(|_request, response, context| async move {
//!         tracing::warn!(message = %context.message, "Unauthorized");
//!         Ok(response)
//!     })
//!     .build()?;
//! # let _ = config;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/tollgate-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod loader;
mod options;

pub use error::ConfigError;
pub use loader::OptionsLoader;
pub use options::GateOptions;
