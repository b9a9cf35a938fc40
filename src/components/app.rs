use crate::config::PlayerConfig;

use super::escape;
use super::player::PLAYER_TAG;

/// Root markup: a single player element.
pub fn app(config: &PlayerConfig) -> String {
    format!(
        r#"<{PLAYER_TAG} tag="{}" title="{}"></{PLAYER_TAG}>"#,
        config.heading.as_str(),
        escape(&config.title),
    )
}
