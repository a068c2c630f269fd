//! Shared constants for the migration pipeline.

/// Watermark HTTP service endpoint.
pub const WATERMARK_ENDPOINT: &str = "https://quickchart.io/watermark";

/// Default worker pool size for the photo migration phase.
pub const DEFAULT_THREADS: usize = 5;

/// Worker pool size for the blueprint migration phase (not configurable).
pub const BLUEPRINT_POOL_SIZE: usize = 5;

/// Default timeout in seconds for image and watermark-service requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of retries after a failed watermark-service call.
pub const DEFAULT_N_TRIES: u32 = 1;

/// Default failure log filename when none is configured.
pub const DEFAULT_LOG_FILENAME: &str = "logs.log";

/// JPEG quality used when re-encoding watermarked images. The watermark
/// service inflates the returned image size, so we re-compress aggressively.
pub const RECOMPRESS_JPEG_QUALITY: u8 = 20;

/// Sub-path marking a unit's photo set.
pub const PHOTOS_SUBPATH: &str = "fotos/";

/// Sub-path marking a unit's blueprint set.
pub const BLUEPRINTS_SUBPATH: &str = "planos/";

/// Administrative folder excluded from migration (matched case-insensitively).
pub const EXCLUDED_FOLDER: &str = "0.-antecedentes";

/// Destination filename for the location plan blueprint.
pub const LOCATION_PLAN_FILENAME: &str = "plano-ubicacion.jpg";

/// Destination filename for the usage plan blueprint.
pub const USAGE_PLAN_FILENAME: &str = "plano-uso.jpg";

/// Content type for every uploaded object.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";
