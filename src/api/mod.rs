mod fetch;
mod schema;

pub use fetch::{
    DEFAULT_PAGE_SIZE, episodes_url, fetch_episodes, fetch_episodes_bytes, parse_episodes,
};
pub use schema::{
    ApiEpisode, RawDuration, RawEpisode, RawFile, coerce_duration, parse_published_at,
    validate_episode, validate_episodes,
};
