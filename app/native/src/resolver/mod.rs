//! Banner resolution.
//!
//! Pure functions from a note's metadata snapshot and the current settings to
//! everything the banner component needs:
//!
//! - [`resolve_banner`] - which image, by precedence
//! - [`resolve_image_url`] - a loadable URL or an inline error
//! - [`resolve_header`] - header text, icon and layout
//! - [`resolve_display_props`] - height, offset, style and margin
//! - [`substitute`] - `{{placeholder}}` expansion for header text

mod banner;
mod header;
mod image;
mod props;
pub mod template;

pub use banner::{BannerOrigin, BannerResolution, ResolvedBanner, SourceKind, resolve_banner};
pub use header::{HeaderDescriptor, resolve_header};
pub use image::{ImageOutcome, resolve_image_url};
pub use props::{DisplayProps, VerticalOffset, resolve_display_props};
pub use template::{Substitution, substitute};
