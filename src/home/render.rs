// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::LazyLock;

use handlebars::{Handlebars, TemplateError, handlebars_helper};
use serde::Serialize;

use crate::episode::{Episode, episode_path};
use crate::error::RenderError;

use super::{HomeProps, Section};

/// Document title of the homepage
pub const PAGE_TITLE: &str = "Home | Podcastr";

const HOME_TEMPLATE: &str = "home";
const EPISODE_TEMPLATE: &str = "episode";
const EPISODE_PATH_HELPER: &str = "episode_path";

handlebars_helper!(episode_path_helper: |id: String| episode_path(&id));

static TEMPLATES: LazyLock<Result<Handlebars<'static>, String>> =
    LazyLock::new(|| register_templates().map_err(|e| e.to_string()));

fn register_templates() -> Result<Handlebars<'static>, TemplateError> {
    let mut reg = Handlebars::new();
    reg.register_helper(EPISODE_PATH_HELPER, Box::new(episode_path_helper));

    reg.register_partial("layout", include_str!("templates/layout.hbs"))?;
    reg.register_partial("play", include_str!("templates/play.hbs"))?;
    reg.register_partial("player", include_str!("templates/player.hbs"))?;
    reg.register_template_string(HOME_TEMPLATE, include_str!("templates/home.hbs"))?;
    reg.register_template_string(EPISODE_TEMPLATE, include_str!("templates/episode.hbs"))?;

    Ok(reg)
}

/// Where a rendered homepage is going to be served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Behind the server: play triggers post to `/play`
    Served,
    /// A standalone file: play triggers are handled by an in-page player
    Standalone,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HomePage<'a> {
    title: &'static str,
    version: String,
    standalone: bool,
    episode_list: Option<String>,
    latest_episodes: Vec<EpisodeRow<'a>>,
    all_episodes: Vec<EpisodeRow<'a>>,
}

/// An episode plus the absolute index its play trigger carries
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeRow<'a> {
    #[serde(flatten)]
    episode: &'a Episode,
    play_index: usize,
}

#[derive(Serialize)]
struct EpisodePage<'a> {
    title: String,
    episode: &'a Episode,
}

/// Render the homepage document
pub fn render_home(props: &HomeProps, mode: PageMode) -> Result<String, RenderError> {
    let standalone = mode == PageMode::Standalone;
    let episode_list = if standalone {
        Some(serde_json::to_string(&props.episode_list())?)
    } else {
        None
    };

    let page = HomePage {
        title: PAGE_TITLE,
        version: props.list_version(),
        standalone,
        episode_list,
        latest_episodes: episode_rows(props, Section::Latest),
        all_episodes: episode_rows(props, Section::Catalog),
    };

    render(HOME_TEMPLATE, &page)
}

fn episode_rows(props: &HomeProps, section: Section) -> Vec<EpisodeRow<'_>> {
    let episodes = match section {
        Section::Latest => &props.latest_episodes,
        Section::Catalog => &props.all_episodes,
    };

    episodes
        .iter()
        .enumerate()
        .map(|(local_index, episode)| EpisodeRow {
            episode,
            play_index: props.play_index(section, local_index),
        })
        .collect()
}

/// Render the detail page of one episode
pub fn render_episode_page(episode: &Episode) -> Result<String, RenderError> {
    let page = EpisodePage {
        title: format!("{} | Podcastr", episode.title),
        episode,
    };

    render(EPISODE_TEMPLATE, &page)
}

fn render<T: Serialize>(template: &'static str, data: &T) -> Result<String, RenderError> {
    let reg = TEMPLATES
        .as_ref()
        .map_err(|e| RenderError::TemplatesUnavailable(e.clone()))?;

    reg.render(template, data)
        .map_err(|e| RenderError::Template {
            template,
            source: e,
        })
}
