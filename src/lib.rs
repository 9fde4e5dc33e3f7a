pub mod api;
pub mod cache;
pub mod episode;
pub mod error;
pub mod home;
pub mod http;
pub mod player;
pub mod progress;
pub mod regenerate;
pub mod server;

// Re-export main types for convenience
pub use api::{ApiEpisode, RawEpisode, episodes_url, fetch_episodes, validate_episodes};
pub use cache::{CacheStatus, RevalidatingCache};
pub use episode::{Episode, format_duration, format_published_at, transform_episodes};
pub use error::{BuildError, FetchError, PlayError, RegenerateError, RenderError, SchemaError};
pub use home::{HomeProps, PageMode, Section, partition_episodes, render_home};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use player::{PlaybackController, PlaybackQueue, QueueState};
pub use progress::{
    NoopReporter, RegenerationEvent, RegenerationReporter, SharedRegenerationReporter,
    TracingReporter,
};
pub use regenerate::{HomeSnapshot, SiteOptions, build_static_page, regenerate_home};
pub use server::{AppState, router, serve};
