//! Backend communication and browser services.
//!
//! # Services
//!
//! - [`upload`] - upload/delete/reload calls against `/upload-files`
//! - [`page`] - values embedded in the host page (CSRF token)
//! - [`timer`] - browser timer for timed banners

pub mod page;
pub mod timer;
pub mod upload;

pub use page::*;
pub use timer::*;
pub use upload::*;
