//! Mip chain generation for texture preprocessing.
//!
//! A [`MipGenerator`] resamples every level directly from the source image with a
//! [`FilterKernel`] chosen by the texture's [`FilterProfile`], then runs an ordered list of
//! [`PostProcessor`]s over the finished chain:
//!
//! - [`ToksvigProcessor`] widens roughness (or narrows gloss) where averaging hides normal detail.
//! - [`AoProcessor`] keeps ambient occlusion from fading to grey at coarse levels.
//!
//! [`NormalMapMatcher`] locates the companion normal map a [`ToksvigProcessor`] needs.
//!
//! ```no_run
//! use texprep_common::{Raster, TextureType};
//! use texprep_mipmap::{AoProcessor, AoSettings, MipGenerator, PostProcessor};
//!
//! let source = Raster::new(256, 256).unwrap();
//! let chain = MipGenerator::for_texture_type(TextureType::AmbientOcclusion)
//!     .with_post_processor(PostProcessor::AmbientOcclusion(AoProcessor::new(
//!         AoSettings::default(),
//!     )))
//!     .generate(&source)
//!     .unwrap();
//! assert_eq!(chain.len(), 9);
//! ```

pub mod ao;
pub mod error;
pub mod generator;
pub mod kernel;
pub mod normal_match;
pub mod post_process;
pub mod profile;
pub mod resample;
pub mod toksvig;

pub use ao::{AoMode, AoProcessor, AoSettings};
pub use error::{MipError, MipResult};
pub use generator::{MipGenerator, ValueDomain};
pub use kernel::FilterKernel;
pub use normal_match::NormalMapMatcher;
pub use post_process::PostProcessor;
pub use profile::FilterProfile;
pub use toksvig::{ToksvigMode, ToksvigProcessor, ToksvigSettings};
