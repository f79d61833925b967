/*!
 * Subtitle translation against a remote translation service.
 *
 * - `core`: the service handle and the language validator
 * - `batch`: the bounded, order-preserving cue pipeline
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, ProgressFn};
pub use self::core::{TranslationOptions, TranslationService};

// Submodules
pub mod batch;
pub mod core;
